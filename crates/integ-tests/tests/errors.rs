use integ_tests::invalid;

invalid!(
    unknown_key,
    "[gps]\nspeed = 3\n",
    "unknown key `speed` at line 2, column 1"
);
invalid!(
    unknown_table,
    "[beacon.hz]\n",
    "unknown key `hz` at line 1, column 9"
);
invalid!(
    scalar_used_as_table,
    "[gps.device]\n",
    "`device` is not declared as a table at line 1, column 1"
);
invalid!(
    table_used_as_array,
    "[[gps]]\n",
    "`gps` is not declared as an array of tables at line 1, column 1"
);
invalid!(
    too_many_radios,
    "[[engine.radios]]\n[[engine.radios]]\n[[engine.radios]]\n",
    "too many array elements (capacity 2) at line 3, column 1"
);
invalid!(
    too_many_spreading_factors,
    "[engine]\nenable_sf = [5, 6, 7, 8, 9, 10, 11, 12, 13]\n",
    "too many array elements (capacity 8) at line 2, column 41"
);
invalid!(
    string_for_float,
    "[gps]\nlat = \"north\"\n",
    "type mismatch: expected a float, found a string at line 2, column 7"
);
invalid!(
    integer_for_float,
    "[gps]\nalt = 145\n",
    "type mismatch: expected a float, found an integer at line 2, column 7"
);
invalid!(
    clock_source_out_of_range,
    "[engine]\nclksrc = 300\n",
    "out of range of 'u8' at line 2, column 10"
);
invalid!(
    bare_string_value,
    "[gps]\ndevice = ttyAMA0\n",
    "invalid TOML value, did you mean to use a quoted string? at line 2, column 10"
);
invalid!(
    missing_equals,
    "[gps]\nlat 46.24\n",
    "expected an equals, found a float at line 2, column 5"
);
invalid!(
    unterminated_header,
    "[gps\nlat = 1.0\n",
    "expected a right bracket, found a newline at line 1, column 5"
);
invalid!(
    nested_gain_arrays,
    "[[engine.radios]]\n[engine.radios.tx]\ngains = [[12]]\n",
    "arrays of arrays are not supported at line 3, column 9"
);

use std::fmt;

#[cfg(test)]
#[path = "./time_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeOffset {
    /// `Z`, a UTC offset of 00:00.
    Z,
    /// Offset between local time and UTC
    Custom { minutes: i16 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Time {
    flags: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
}

impl Time {
    /// Number of digits in the original fractional seconds, 0 if there were none.
    pub fn subsecond_precision(&self) -> u8 {
        self.flags >> NANO_SHIFT
    }

    /// Whether seconds were present in the input, as opposed to defaulted to 0.
    pub fn has_seconds(&self) -> bool {
        self.flags & HAS_SECONDS != 0
    }
}

/// A date-time value as written in a document: a date, a time, or both,
/// with an optional UTC offset.
///
/// Decoding is lexical. Each field is range checked on its own, so
/// `2023-02-31` is accepted; whether a day exists in a given month is left
/// to the caller.
///
/// The default value holds neither a date nor a time and formats as an empty
/// string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Datetime {
    date: Date,
    flags: u8,
    hour: u8,
    minute: u8,
    seconds: u8,
    offset_minutes: i16,
    nanos: u32,
}

const HAS_DATE: u8 = 1 << 0;
const HAS_TIME: u8 = 1 << 1;
const HAS_SECONDS: u8 = 1 << 2;
const NANO_SHIFT: u8 = 4;

const NO_OFFSET: i16 = i16::MIN;
const ZULU: i16 = i16::MAX;

impl Default for Datetime {
    fn default() -> Self {
        Datetime {
            date: Date::default(),
            flags: 0,
            hour: 0,
            minute: 0,
            seconds: 0,
            offset_minutes: NO_OFFSET,
            nanos: 0,
        }
    }
}

impl Datetime {
    /// Decodes a complete date-time lexeme. Returns `None` if the text is
    /// not a date-time or has trailing bytes.
    pub fn parse(input: &[u8]) -> Option<Datetime> {
        match Datetime::munch(input) {
            Some((len, value)) if len == input.len() => Some(value),
            _ => None,
        }
    }

    /// Decodes the longest date-time prefix of `input`, returning the number
    /// of bytes consumed.
    pub(crate) fn munch(input: &[u8]) -> Option<(usize, Datetime)> {
        enum State {
            Year,
            Month,
            Day,
            Hour,
            Minute,
            Second,
            Frac,
            OffHour,
            OffMin,
        }
        let mut state = match input {
            [_, _, b':', _, _, ..] => State::Hour,
            [_, _, _, _, b'-', _, _, b'-', ..] => State::Year,
            _ => return None,
        };

        let mut value = Datetime::default();
        let mut current = 0u32;
        let mut len = 0u32;
        let mut off_sign: i16 = 1;
        let mut off_hour: u8 = 0;
        let mut i = 0usize;
        let mut valid = false;

        'outer: loop {
            let byte = input.get(i).copied().unwrap_or(0);
            if byte.is_ascii_digit() {
                len += 1;
                if len <= 9 {
                    current = current * 10 + u32::from(byte - b'0');
                }
                i += 1;
                continue;
            }
            'next: {
                match state {
                    State::Year => {
                        if len != 4 || byte != b'-' {
                            break 'outer;
                        }
                        value.date.year = current as u16;
                        state = State::Month;
                        break 'next;
                    }
                    State::Month => {
                        if len != 2 || byte != b'-' || !(1..=12).contains(&current) {
                            break 'outer;
                        }
                        value.date.month = current as u8;
                        state = State::Day;
                        break 'next;
                    }
                    State::Day => {
                        if len != 2 || !(1..=31).contains(&current) {
                            break 'outer;
                        }
                        value.date.day = current as u8;
                        value.flags |= HAS_DATE;
                        if byte == b'T'
                            || byte == b't'
                            || (byte == b' ' && input.get(i + 1).is_some_and(u8::is_ascii_digit))
                        {
                            state = State::Hour;
                            break 'next;
                        }
                        valid = true;
                        break 'outer;
                    }
                    State::Hour => {
                        if len != 2 || byte != b':' || current > 23 {
                            break 'outer;
                        }
                        value.hour = current as u8;
                        state = State::Minute;
                        break 'next;
                    }
                    State::Minute => {
                        if len != 2 || current > 59 {
                            break 'outer;
                        }
                        value.minute = current as u8;
                        value.flags |= HAS_TIME;
                        if byte == b':' {
                            state = State::Second;
                            break 'next;
                        }
                    }
                    State::Second => {
                        // 60 is a leap second.
                        if len != 2 || current > 60 {
                            break 'outer;
                        }
                        value.seconds = current as u8;
                        value.flags |= HAS_SECONDS;
                        if byte == b'.' {
                            state = State::Frac;
                            break 'next;
                        }
                    }
                    State::Frac => {
                        if len == 0 {
                            break 'outer;
                        }
                        let nd = len.min(9);
                        let mut nanos = current;
                        for _ in nd..9 {
                            nanos *= 10;
                        }
                        value.nanos = nanos;
                        value.flags |= (nd as u8) << NANO_SHIFT;
                    }
                    State::OffHour => {
                        if len != 2 || byte != b':' || current > 23 {
                            break 'outer;
                        }
                        off_hour = current as u8;
                        state = State::OffMin;
                        break 'next;
                    }
                    State::OffMin => {
                        if len != 2 || current > 59 {
                            break 'outer;
                        }
                        value.offset_minutes =
                            off_sign * (i16::from(off_hour) * 60 + current as i16);
                        valid = true;
                        break 'outer;
                    }
                }
                // A time component just ended; an offset may follow.
                match byte {
                    b'Z' | b'z' => {
                        value.offset_minutes = ZULU;
                        i += 1;
                        valid = true;
                        break 'outer;
                    }
                    b'+' => {
                        off_sign = 1;
                        state = State::OffHour;
                    }
                    b'-' => {
                        off_sign = -1;
                        state = State::OffHour;
                    }
                    _ => {
                        valid = true;
                        break 'outer;
                    }
                }
            }
            i += 1;
            current = 0;
            len = 0;
        }
        // A local time cannot carry an offset.
        if !valid || (value.flags & HAS_DATE == 0 && value.offset_minutes != NO_OFFSET) {
            return None;
        }
        Some((i, value))
    }

    pub fn date(&self) -> Option<Date> {
        if self.flags & HAS_DATE != 0 {
            Some(self.date)
        } else {
            None
        }
    }

    pub fn time(&self) -> Option<Time> {
        if self.flags & HAS_TIME != 0 {
            Some(Time {
                flags: self.flags,
                hour: self.hour,
                minute: self.minute,
                second: self.seconds,
                nanosecond: self.nanos,
            })
        } else {
            None
        }
    }

    pub fn offset(&self) -> Option<TimeOffset> {
        match self.offset_minutes {
            ZULU => Some(TimeOffset::Z),
            NO_OFFSET => None,
            minutes => Some(TimeOffset::Custom { minutes }),
        }
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(date) = self.date() {
            write!(f, "{:04}-{:02}-{:02}", date.year, date.month, date.day)?;
            if self.flags & HAS_TIME != 0 {
                f.write_str("T")?;
            }
        }
        let Some(time) = self.time() else {
            return Ok(());
        };
        write!(f, "{:02}:{:02}:{:02}", time.hour, time.minute, time.second)?;
        let nd = usize::from(time.subsecond_precision());
        if nd > 0 {
            let frac = time.nanosecond / 10u32.pow(9 - nd as u32);
            write!(f, ".{frac:0nd$}")?;
        }
        match self.offset() {
            None => {}
            Some(TimeOffset::Z) | Some(TimeOffset::Custom { minutes: 0 }) => f.write_str("Z")?,
            Some(TimeOffset::Custom { minutes }) => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let abs = minutes.unsigned_abs();
                write!(f, "{sign}{:02}:{:02}", abs / 60, abs % 60)?;
            }
        }
        Ok(())
    }
}

use std::fmt;

use serde::{Serialize, Serializer};
use time::{Date, Month};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// Russian display name, as shown to users.
    pub fn name(self) -> &'static str {
        match self {
            Self::Aries => "Овен",
            Self::Taurus => "Телец",
            Self::Gemini => "Близнецы",
            Self::Cancer => "Рак",
            Self::Leo => "Лев",
            Self::Virgo => "Дева",
            Self::Libra => "Весы",
            Self::Scorpio => "Скорпион",
            Self::Sagittarius => "Стрелец",
            Self::Capricorn => "Козерог",
            Self::Aquarius => "Водолей",
            Self::Pisces => "Рыбы",
        }
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for ZodiacSign {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Tropical sign for a birth date. Each entry is the first day of a sign;
/// a date belongs to the latest start on or before it.
pub fn zodiac_sign(date: Date) -> ZodiacSign {
    use Month::*;
    use ZodiacSign::*;

    const STARTS: [(Month, u8, ZodiacSign); 12] = [
        (January, 20, Aquarius),
        (February, 19, Pisces),
        (March, 21, Aries),
        (April, 20, Taurus),
        (May, 21, Gemini),
        (June, 21, Cancer),
        (July, 23, Leo),
        (August, 23, Virgo),
        (September, 23, Libra),
        (October, 23, Scorpio),
        (November, 22, Sagittarius),
        (December, 22, Capricorn),
    ];

    let key = (date.month() as u8, date.day());
    STARTS
        .iter()
        .rev()
        .find(|(month, day, _)| key >= (*month as u8, *day))
        .map(|(_, _, sign)| *sign)
        .unwrap_or(Capricorn)
}

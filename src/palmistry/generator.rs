//! Deterministic palm readings.
//!
//! A SHA-256 digest of the seed picks one phrase per section from fixed
//! banks, so the same seed always yields the same text.

use sha2::{Digest, Sha256};

const LIFE_LINE: &[&str] = &[
    "Линия жизни глубокая и ровная: у вас крепкий запас сил и умение быстро восстанавливаться.",
    "Линия жизни делает широкую дугу: вы открыты новому опыту и легко меняете обстановку.",
    "Линия жизни прерывается и продолжается снова: в вашей судьбе есть поворот, после которого всё начинается заново.",
    "Линия жизни идёт близко к большому пальцу: вы бережёте энергию и тратите её на самое важное.",
    "Линия жизни раздваивается у основания ладони: вас ждёт долгая и насыщенная вторая половина жизни.",
];

const HEART_LINE: &[&str] = &[
    "Линия сердца поднимается к указательному пальцу: в любви вы ищете глубину, а не мимолётные увлечения.",
    "Линия сердца прямая и длинная: вы цените спокойствие и надёжность в отношениях.",
    "Линия сердца изогнута: вы открыто проявляете чувства и умеете поддержать близких.",
    "Линия сердца заканчивается между пальцами: вы умеете сочетать страсть и здравый смысл.",
    "На линии сердца видны мелкие ответвления: вокруг вас много людей, которые дорожат вашим теплом.",
];

const HEAD_LINE: &[&str] = &[
    "Линия ума длинная и чёткая: вы мыслите системно и доводите начатое до конца.",
    "Линия ума плавно уходит вниз: у вас сильное воображение и творческое мышление.",
    "Линия ума короткая и глубокая: вы принимаете решения быстро и уверенно.",
    "Линия ума начинается отдельно от линии жизни: вы рано научились полагаться на собственное мнение.",
];

const FATE_LINE: &[&str] = &[
    "Линия судьбы отчётливо поднимается к среднему пальцу: вы идёте к цели, даже когда путь неочевиден.",
    "Линия судьбы начинается от линии жизни: своих успехов вы добиваетесь сами.",
    "Линия судьбы едва заметна: вы свободны выбирать путь и не связаны чужими ожиданиями.",
    "Линия судьбы пересекает ладонь в несколько приёмов: перемены в карьере принесут вам удачу.",
];

const FORECAST_LOVE: &[&str] = &[
    "В ближайшие месяцы в личной жизни откроется новая глава: будьте внимательны к случайным встречам.",
    "Отношения выйдут на новый уровень доверия, если вы первыми сделаете шаг навстречу.",
    "Старая история получит неожиданное продолжение и поможет вам понять, чего вы хотите на самом деле.",
];

const FORECAST_CAREER: &[&str] = &[
    "В работе наступает период роста: проект, который вы откладывали, принесёт признание.",
    "Скоро появится предложение, которое изменит ваш профессиональный путь. Не спешите отказываться.",
    "Ваши знания окажутся востребованы: смело заявляйте о себе и своих идеях.",
];

const FORECAST_HEALTH: &[&str] = &[
    "Тело подсказывает вам замедлиться: режим сна и прогулки вернут силы быстрее любых средств.",
    "Период восстановления подходит к концу, впереди время энергии и лёгкости.",
    "Небольшие ежедневные привычки дадут заметный результат уже через пару месяцев.",
];

const FORECAST_MONEY: &[&str] = &[
    "Финансовый поток усиливается: обратите внимание на дополнительный источник дохода.",
    "Осторожность в тратах сейчас обернётся свободой через полгода.",
    "Удачное вложение в собственные навыки принесёт больше любых сбережений.",
];

const FORECAST_GENERAL: &[&str] = &[
    "Впереди время, когда многое будет складываться в вашу пользу. Доверяйте интуиции.",
    "Ближайший сезон принесёт ясность в вопросе, который давно вас тревожит.",
    "Ваша ладонь говорит о скором обновлении: отпустите то, что тянет назад.",
];

#[derive(Debug, Clone, Copy)]
pub struct ReadingSeed<'a> {
    pub session_id: &'a str,
    pub name: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub focus_area: Option<&'a str>,
    pub hand_score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reading {
    pub preview: String,
    pub full: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Love,
    Career,
    Health,
    Money,
    General,
}

impl Focus {
    fn detect(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::General;
        };
        let raw = raw.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| raw.contains(n));
        if has(&["любов", "отношен", "love", "relationship"]) {
            Self::Love
        } else if has(&["карьер", "работ", "career", "work"]) {
            Self::Career
        } else if has(&["здоров", "health"]) {
            Self::Health
        } else if has(&["деньг", "финанс", "money", "finance"]) {
            Self::Money
        } else {
            Self::General
        }
    }

    fn bank(self) -> &'static [&'static str] {
        match self {
            Self::Love => FORECAST_LOVE,
            Self::Career => FORECAST_CAREER,
            Self::Health => FORECAST_HEALTH,
            Self::Money => FORECAST_MONEY,
            Self::General => FORECAST_GENERAL,
        }
    }
}

fn clarity(hand_score: f64) -> &'static str {
    if hand_score >= 0.85 {
        "Линии на вашей ладони читаются очень чётко."
    } else if hand_score >= 0.6 {
        "Основные линии на вашей ладони хорошо различимы."
    } else {
        "Линии на снимке видны не полностью, поэтому разбор опирается на самые заметные из них."
    }
}

fn ready_word(gender: Option<&str>) -> &'static str {
    match gender.map(str::to_lowercase).as_deref() {
        Some("female" | "f" | "женский" | "ж") => "готова",
        Some("male" | "m" | "мужской" | "м") => "готов",
        _ => "готовы",
    }
}

fn digest(seed: &ReadingSeed<'_>) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in [
        seed.session_id,
        seed.name.unwrap_or_default(),
        seed.gender.unwrap_or_default(),
        seed.focus_area.unwrap_or_default(),
    ] {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(format!("{:.3}", seed.hand_score).as_bytes());
    hasher.finalize().into()
}

fn pick(bank: &'static [&'static str], byte: u8) -> &'static str {
    bank[usize::from(byte) % bank.len()]
}

pub fn generate_reading(seed: &ReadingSeed<'_>) -> Reading {
    let d = digest(seed);
    let life = pick(LIFE_LINE, d[0]);
    let heart = pick(HEART_LINE, d[1]);
    let head = pick(HEAD_LINE, d[2]);
    let fate = pick(FATE_LINE, d[3]);
    let forecast = pick(Focus::detect(seed.focus_area).bank(), d[4]);
    let clarity = clarity(seed.hand_score);

    let greeting = match seed.name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("{name}, вот что рассказывает ваша ладонь."),
        None => "Вот что рассказывает ваша ладонь.".to_owned(),
    };

    let preview = format!(
        "{greeting} {clarity}\n\n{life}\n\nПолный разбор линий сердца, ума и судьбы, а также личный прогноз ждут вас после открытия."
    );

    let full = format!(
        "{greeting} {clarity}\n\n\
         Линия жизни\n{life}\n\n\
         Линия сердца\n{heart}\n\n\
         Линия ума\n{head}\n\n\
         Линия судьбы\n{fate}\n\n\
         Прогноз\n{forecast}\n\n\
         Вы {ready} к переменам, и ладонь показывает, что они будут к лучшему.",
        ready = ready_word(seed.gender),
    );

    Reading { preview, full }
}

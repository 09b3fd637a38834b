//! Demographic field catalog.

use ppmi_model::{DemographicField, DemographicOp};

fn text_map(pairs: &[(&str, &str)]) -> DemographicOp {
    DemographicOp::MapText(
        pairs
            .iter()
            .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
            .collect(),
    )
}

fn code_map(pairs: &[(i64, &str)], fallback: Option<&str>) -> DemographicOp {
    DemographicOp::MapCode {
        map: pairs
            .iter()
            .map(|(code, label)| (*code, (*label).to_string()))
            .collect(),
        fallback: fallback.map(str::to_string),
    }
}

pub fn demographic_fields() -> Vec<DemographicField> {
    vec![
        DemographicField::new(
            "diagnosis",
            "Patient_Status.csv",
            &["ENROLL_CAT"],
            text_map(&[
                ("PD", "pd"),
                ("HC", "hc"),
                ("SWEDD", "swedd"),
                ("PRODROMA", "prod"),
                ("GENPD", "genpd"),
                ("GENUN", "genun"),
                ("REGPD", "regpd"),
                ("REGUN", "regun"),
            ]),
        ),
        DemographicField::new(
            "date_birth",
            "Randomization_table.csv",
            &["BIRTHDT"],
            DemographicOp::ParseDate,
        ),
        DemographicField::new(
            "date_diagnosis",
            "PD_Features.csv",
            &["PDDXDT"],
            DemographicOp::ParseDate,
        ),
        DemographicField::new(
            "date_enroll",
            "Randomization_table.csv",
            &["ENROLLDT"],
            DemographicOp::ParseDate,
        ),
        DemographicField::new(
            "status",
            "Patient_Status.csv",
            &["ENROLL_STATUS"],
            DemographicOp::Lowercase,
        ),
        DemographicField::new(
            "family_history",
            "Family_History__PD_.csv",
            &[
                "BIOMOMPD", "BIODADPD", "FULSIBPD", "HAFSIBPD", "MAGPARPD", "PAGPARPD",
                "MATAUPD", "PATAUPD", "KIDSPD",
            ],
            DemographicOp::CountPositive,
        ),
        DemographicField::new(
            "age",
            "Randomization_table.csv",
            &["BIRTHDT", "ENROLLDT"],
            DemographicOp::YearsBetween,
        ),
        DemographicField::new(
            "gender",
            "Randomization_table.csv",
            &["GENDER"],
            code_map(&[(0, "f"), (1, "f"), (2, "m")], Some("ns")),
        ),
        DemographicField::new(
            "race",
            "Screening___Demographics.csv",
            &[
                "RAINDALS", "RAASIAN", "RABLACK", "RAHAWOPI", "RAWHITE", "RANOS",
            ],
            DemographicOp::RaceLabel(
                ["indals", "asian", "black", "hawopi", "white", "ns"]
                    .iter()
                    .map(|label| (*label).to_string())
                    .collect(),
            ),
        ),
        DemographicField::new(
            "site",
            "Center-Subject_List.csv",
            &["CNO"],
            DemographicOp::Numeric,
        ),
        DemographicField::new(
            "handedness",
            "Socio-Economics.csv",
            &["HANDED"],
            code_map(&[(1, "right"), (2, "left"), (3, "both")], None),
        ),
        DemographicField::new(
            "education",
            "Socio-Economics.csv",
            &["EDUCYRS"],
            DemographicOp::Numeric,
        ),
    ]
}

//! Behavioral measure catalog.
//!
//! One entry per derivable clinical-behavioral score, transcribed from the
//! study's instrument scoring manuals. Item columns are named exactly as
//! they appear in the tabular exports, including the export's own
//! misspellings (`PN3RIGRL`), because columns are addressed by name.

use ppmi_model::{ItemTransform, MeasureDefinition, Reducer, Result};

/// "Not applicable" sentinel used by the autonomic questionnaire.
const SCAU_SENTINEL: f64 = 9.0;

pub fn behavioral_measures() -> Result<Vec<MeasureDefinition>> {
    Ok(vec![
        benton()?,
        education()?,
        epworth()?,
        gds()?,
        hvlt_recall()?,
        hvlt_recognition()?,
        hvlt_retention()?,
        lns()?,
        moca_unadj()?,
        pigd()?,
        quip()?,
        rbd()?,
        scopa_aut()?,
        se_adl()?,
        semantic_fluency()?,
        stai_state()?,
        stai_trait()?,
        symbol_digit()?,
        systolic_bp_drop()?,
        tremor()?,
        updrs_i()?,
        updrs_ii()?,
        updrs_iii()?,
        updrs_iv()?,
        upsit()?,
    ])
}

fn benton() -> Result<MeasureDefinition> {
    let items: Vec<String> = (1..=30).map(|n| format!("BJLOT{n}")).collect();
    let refs: Vec<&str> = items.iter().map(String::as_str).collect();
    MeasureDefinition::builder("benton")
        .source("Benton_Judgment_of_Line_Orientation.csv", &[&refs])
        .build()
}

/// Years of education, kept raw. Feeds the cognitive-score adjustment rule
/// and is only emitted standalone when requested by name.
fn education() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("education")
        .source("Socio-Economics.csv", &[&["EDUCYRS"]])
        .build()
}

fn epworth() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("epworth")
        .source(
            "Epworth_Sleepiness_Scale.csv",
            &[&[
                "ESS1", "ESS2", "ESS3", "ESS4", "ESS5", "ESS6", "ESS7", "ESS8",
            ]],
        )
        .build()
}

/// Geriatric depression scale: the five "satisfied" items score when
/// answered no, the remaining ten when answered yes.
fn gds() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("gds")
        .source(
            "Geriatric_Depression_Scale__Short_.csv",
            &[
                &["GDSSATIS", "GDSGSPIR", "GDSHAPPY", "GDSALIVE", "GDSENRGY"],
                &[
                    "GDSDROPD", "GDSEMPTY", "GDSBORED", "GDSAFRAD", "GDSHLPLS", "GDSHOME",
                    "GDSMEMRY", "GDSWRTLS", "GDSHOPLS", "GDSBETER",
                ],
            ],
        )
        .transforms(&[
            ItemTransform::EqualsFlag { target: 0.0 },
            ItemTransform::Identity,
        ])
        .build()
}

fn hvlt_recall() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("hvlt_recall")
        .source(
            "Hopkins_Verbal_Learning_Test.csv",
            &[&["HVLTRT1", "HVLTRT2", "HVLTRT3"]],
        )
        .build()
}

/// Recognition discrimination: hits minus both false-positive counts.
fn hvlt_recognition() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("hvlt_recognition")
        .source(
            "Hopkins_Verbal_Learning_Test.csv",
            &[&["HVLTREC"], &["HVLTFPRL"], &["HVLTFPUN"]],
        )
        .transforms(&[
            ItemTransform::Identity,
            ItemTransform::Negate,
            ItemTransform::Negate,
        ])
        .build()
}

/// Retention: delayed recall divided by the better of trials 2 and 3.
/// The reciprocal transform turns the division into a product, and a zero
/// trial score becomes +∞ so the minimum picks the other trial.
fn hvlt_retention() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("hvlt_retention")
        .source(
            "Hopkins_Verbal_Learning_Test.csv",
            &[&["HVLTRDLY"], &["HVLTRT2", "HVLTRT3"]],
        )
        .transforms(&[ItemTransform::Identity, ItemTransform::Reciprocal])
        .reducers(&[Reducer::Sum, Reducer::Min])
        .combine(Reducer::Product)
        .build()
}

fn lns() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("lns")
        .source(
            "Letter_-_Number_Sequencing__PD_.csv",
            &[&[
                "LNS1A", "LNS1B", "LNS1C", "LNS2A", "LNS2B", "LNS2C", "LNS3A", "LNS3B", "LNS3C",
                "LNS4A", "LNS4B", "LNS4C", "LNS5A", "LNS5B", "LNS5C", "LNS6A", "LNS6B", "LNS6C",
                "LNS7A", "LNS7B", "LNS7C",
            ]],
        )
        .build()
}

/// Unadjusted cognitive screen total. The education adjustment rule
/// replaces this with the adjusted `moca` measure at reconciliation.
fn moca_unadj() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("moca_unadj")
        .source(
            "Montreal_Cognitive_Assessment__MoCA_.csv",
            &[&[
                "MCAALTTM", "MCACUBE", "MCACLCKC", "MCACLCKN", "MCACLCKH", "MCALION", "MCARHINO",
                "MCACAMEL", "MCAFDS", "MCABDS", "MCAVIGIL", "MCASER7", "MCASNTNC", "MCAVF",
                "MCAABSTR", "MCAREC1", "MCAREC2", "MCAREC3", "MCAREC4", "MCAREC5", "MCADATE",
                "MCAMONTH", "MCAYR", "MCADAY", "MCAPLACE", "MCACITY",
            ]],
        )
        .build()
}

/// Postural instability / gait difficulty: mean of the patient-reported and
/// examiner-rated axial sub-scores, merged across two instruments.
fn pigd() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("pigd")
        .source(
            "MDS_UPDRS_Part_II__Patient_Questionnaire.csv",
            &[&["NP2WALK", "NP2FREZ"]],
        )
        .source(
            "MDS_UPDRS_Part_III.csv",
            &[&["NP3GAIT", "NP3FRZGT", "NP3PSTBL"]],
        )
        .combine(Reducer::Mean)
        .merge_key()
        .build()
}

/// Impulsive-compulsive screen: four any-endorsed domains plus a summed
/// hobbyism/punding/walkabout group.
fn quip() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("quip")
        .source(
            "QUIP_Current_Short.csv",
            &[
                &["CNTRLGMB", "TMGAMBLE"],
                &["CNTRLSEX", "TMSEX"],
                &["CNTRLBUY", "TMBUY"],
                &["CNTRLEAT", "TMEAT"],
                &["TMTORACT", "TMTMTACT", "TMTRWD"],
            ],
        )
        .reducers(&[
            Reducer::AnyTrue,
            Reducer::AnyTrue,
            Reducer::AnyTrue,
            Reducer::AnyTrue,
            Reducer::Sum,
        ])
        .build()
}

/// REM-behavior screen: symptom count plus one point for any qualifying
/// neurological comorbidity.
fn rbd() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("rbd")
        .source(
            "REM_Sleep_Disorder_Questionnaire.csv",
            &[
                &[
                    "DRMVIVID", "DRMAGRAC", "DRMNOCTB", "SLPLMBMV", "SLPINJUR", "DRMVERBL",
                    "DRMFIGHT", "DRMUMV", "DRMOBJFL", "MVAWAKEN", "DRMREMEM", "SLPDSTRB",
                ],
                &[
                    "STROKE", "HETRA", "PARKISM", "RLS", "NARCLPSY", "DEPRS", "EPILEPSY",
                    "BRNINFM", "CNSOTH",
                ],
            ],
        )
        .reducers(&[Reducer::Sum, Reducer::AnyTrue])
        .build()
}

/// Autonomic questionnaire. The reserved code 9 means "not applicable":
/// worth 3 points on the gastrointestinal/urinary items, 0 on the sexual
/// items.
fn scopa_aut() -> Result<MeasureDefinition> {
    let gastro: Vec<String> = (1..=21).map(|n| format!("SCAU{n}")).collect();
    let gastro_refs: Vec<&str> = gastro.iter().map(String::as_str).collect();
    MeasureDefinition::builder("scopa_aut")
        .source(
            "SCOPA-AUT.csv",
            &[&gastro_refs, &["SCAU22", "SCAU23", "SCAU24", "SCAU25"]],
        )
        .transforms(&[
            ItemTransform::RecodeSentinel {
                sentinel: SCAU_SENTINEL,
                replacement: 3.0,
            },
            ItemTransform::RecodeSentinel {
                sentinel: SCAU_SENTINEL,
                replacement: 0.0,
            },
        ])
        .build()
}

fn se_adl() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("se_adl")
        .source("Modified_Schwab_+_England_ADL.csv", &[&["MSEADLG"]])
        .build()
}

fn semantic_fluency() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("semantic_fluency")
        .source("Semantic_Fluency.csv", &[&["VLTANIM", "VLTVEG", "VLTFRUIT"]])
        .build()
}

/// State anxiety: half the items are reverse-keyed on the 1-4 scale.
fn stai_state() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("stai_state")
        .source(
            "State-Trait_Anxiety_Inventory.csv",
            &[
                &[
                    "STAIAD3", "STAIAD4", "STAIAD6", "STAIAD7", "STAIAD9", "STAIAD12", "STAIAD13",
                    "STAIAD14", "STAIAD17", "STAIAD18",
                ],
                &[
                    "STAIAD1", "STAIAD2", "STAIAD5", "STAIAD8", "STAIAD10", "STAIAD11",
                    "STAIAD15", "STAIAD16", "STAIAD19", "STAIAD20",
                ],
            ],
        )
        .transforms(&[
            ItemTransform::Identity,
            ItemTransform::ReverseScale { pivot: 5.0 },
        ])
        .build()
}

fn stai_trait() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("stai_trait")
        .source(
            "State-Trait_Anxiety_Inventory.csv",
            &[
                &[
                    "STAIAD22", "STAIAD24", "STAIAD25", "STAIAD28", "STAIAD29", "STAIAD31",
                    "STAIAD32", "STAIAD35", "STAIAD37", "STAIAD38", "STAIAD40",
                ],
                &[
                    "STAIAD21", "STAIAD23", "STAIAD26", "STAIAD27", "STAIAD30", "STAIAD33",
                    "STAIAD34", "STAIAD36", "STAIAD39",
                ],
            ],
        )
        .transforms(&[
            ItemTransform::Identity,
            ItemTransform::ReverseScale { pivot: 5.0 },
        ])
        .build()
}

fn symbol_digit() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("symbol_digit")
        .source("Symbol_Digit_Modalities.csv", &[&["SDMTOTAL"]])
        .build()
}

/// Orthostatic drop: supine systolic pressure minus standing.
fn systolic_bp_drop() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("systolic_bp_drop")
        .source("Vital_Signs.csv", &[&["SYSSUP"], &["SYSSTND"]])
        .transforms(&[ItemTransform::Identity, ItemTransform::Negate])
        .build()
}

/// Tremor composite: nan-tolerant mean across patient-reported and
/// examiner-rated tremor items from two instruments.
fn tremor() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("tremor")
        .source(
            "MDS_UPDRS_Part_II__Patient_Questionnaire.csv",
            &[&["NP2TRMR"]],
        )
        .source(
            "MDS_UPDRS_Part_III.csv",
            &[&[
                "NP3PTRMR", "NP3PTRML", "NP3KTRMR", "NP3KTRML", "NP3RTARU", "NP3RTALU",
                "NP3RTARL", "NP3RTALL", "NP3RTALJ", "NP3RTCON",
            ]],
        )
        .combine(Reducer::NanMean)
        .merge_key()
        .build()
}

fn updrs_i() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("updrs_i")
        .source(
            "MDS_UPDRS_Part_I.csv",
            &[&[
                "NP1COG", "NP1HALL", "NP1DPRS", "NP1ANXS", "NP1APAT", "NP1DDS",
            ]],
        )
        .source(
            "MDS_UPDRS_Part_I__Patient_Questionnaire.csv",
            &[&[
                "NP1SLPN", "NP1SLPD", "NP1PAIN", "NP1URIN", "NP1CNST", "NP1LTHD", "NP1FATG",
            ]],
        )
        .merge_key()
        .build()
}

fn updrs_ii() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("updrs_ii")
        .source(
            "MDS_UPDRS_Part_II__Patient_Questionnaire.csv",
            &[&[
                "NP2SPCH", "NP2SALV", "NP2SWAL", "NP2EAT", "NP2DRES", "NP2HYGN", "NP2HWRT",
                "NP2HOBB", "NP2TURN", "NP2TRMR", "NP2RISE", "NP2WALK", "NP2FREZ",
            ]],
        )
        .build()
}

fn updrs_iii() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("updrs_iii")
        .source(
            "MDS_UPDRS_Part_III.csv",
            &[&[
                "NP3SPCH", "NP3FACXP", "NP3RIGN", "NP3RIGRU", "NP3RIGLU", "PN3RIGRL", "NP3RIGLL",
                "NP3FTAPR", "NP3FTAPL", "NP3HMOVR", "NP3HMOVL", "NP3PRSPR", "NP3PRSPL",
                "NP3TTAPR", "NP3TTAPL", "NP3LGAGR", "NP3LGAGL", "NP3RISNG", "NP3GAIT",
                "NP3FRZGT", "NP3PSTBL", "NP3POSTR", "NP3BRADY", "NP3PTRMR", "NP3PTRML",
                "NP3KTRMR", "NP3KTRML", "NP3RTARU", "NP3RTALU", "NP3RTARL", "NP3RTALL",
                "NP3RTALJ", "NP3RTCON",
            ]],
        )
        .build()
}

fn updrs_iv() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("updrs_iv")
        .source(
            "MDS_UPDRS_Part_IV.csv",
            &[&[
                "NP4WDYSK", "NP4DYSKI", "NP4OFF", "NP4FLCTI", "NP4FLCTX", "NP4DYSTN",
            ]],
        )
        .build()
}

fn upsit() -> Result<MeasureDefinition> {
    MeasureDefinition::builder("upsit")
        .source(
            "University_of_Pennsylvania_Smell_ID_Test.csv",
            &[&["UPSITBK1", "UPSITBK2", "UPSITBK3", "UPSITBK4"]],
        )
        .build()
}

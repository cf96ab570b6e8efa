//! Column aliases shared by the scoring passes

use nomen_common::airtable::{AbsentPolicy, FieldKey, FieldSpec};

pub const FULL_NAME: FieldSpec = FieldSpec::new(
    FieldKey::FullName,
    &["full_name", "Full Name", "Name", "fullname", "Full name", "title"],
    AbsentPolicy::Skip,
);

pub const GIVEN_NAME: FieldSpec = FieldSpec::new(
    FieldKey::GivenName,
    &["given_name", "first_name", "First Name", "Given Name"],
    AbsentPolicy::Skip,
);

pub const SURNAME: FieldSpec = FieldSpec::new(
    FieldKey::Surname,
    &["surname", "last_name", "Last Name", "Family Name"],
    AbsentPolicy::Skip,
);

pub const CLUSTER: FieldSpec = FieldSpec::new(
    FieldKey::Cluster,
    &[
        "profession_cluster",
        "professional_cluster",
        "Profession Cluster",
        "cluster",
        "Cluster",
    ],
    AbsentPolicy::Skip,
);

pub const OCCUPATION: FieldSpec = FieldSpec::new(
    FieldKey::Occupation,
    &["profession_canonical", "Profession Canonical", "occupation", "Occupation"],
    AbsentPolicy::Skip,
);

pub const LOCK: FieldSpec = FieldSpec::new(
    FieldKey::Lock,
    &["np_lock", "Lock", "locked", "freeze", "frozen"],
    AbsentPolicy::Skip,
);

const NOTES_FALLBACK: &[&str] = &["notes_qc", "Notes", "Description"];

pub const STATUS: FieldSpec = FieldSpec::new(
    FieldKey::Status,
    &["np_status", "status_np", "NP Status"],
    AbsentPolicy::Skip,
);

pub const CLUSTER_PREDICTION: FieldSpec = FieldSpec::new(
    FieldKey::Prediction,
    &["np_cluster_pred", "np_cluster", "np_pred"],
    AbsentPolicy::Skip,
);

pub const CLUSTER_SCORE: FieldSpec = FieldSpec::new(
    FieldKey::PredictionScore,
    &["np_cluster_score", "np_score", "np_gap"],
    AbsentPolicy::Skip,
);

pub const CLUSTER_EXPLANATION: FieldSpec = FieldSpec::new(
    FieldKey::Explanation,
    &["np_token_explain", "np_explain"],
    AbsentPolicy::Fallback(NOTES_FALLBACK),
);

pub const PROFESSION_PREDICTION: FieldSpec = FieldSpec::new(
    FieldKey::Prediction,
    &["np_prof_pred"],
    AbsentPolicy::Skip,
);

pub const PROFESSION_SCORE: FieldSpec = FieldSpec::new(
    FieldKey::PredictionScore,
    &["np_prof_score"],
    AbsentPolicy::Skip,
);

pub const PROFESSION_EXPLANATION: FieldSpec = FieldSpec::new(
    FieldKey::Explanation,
    &["np_prof_explain"],
    AbsentPolicy::Fallback(NOTES_FALLBACK),
);

/// Previously predicted profession, read by the aligner
pub const PREDICTED_PROFESSION: FieldSpec = FieldSpec::new(
    FieldKey::ProfessionPrediction,
    &["np_prof_pred"],
    AbsentPolicy::Skip,
);

pub const LANGUAGE: FieldSpec = FieldSpec::new(
    FieldKey::Language,
    &["language_origin"],
    AbsentPolicy::Skip,
);

pub const NAME_ROOTS: FieldSpec = FieldSpec::new(
    FieldKey::NameRoots,
    &["name_roots"],
    AbsentPolicy::Canonical,
);

pub const NAME_MEANING: FieldSpec = FieldSpec::new(
    FieldKey::NameMeaning,
    &["name_meaning"],
    AbsentPolicy::Canonical,
);

pub const NAME_ORIGIN: FieldSpec = FieldSpec::new(
    FieldKey::NameOrigin,
    &["name_origin"],
    AbsentPolicy::Canonical,
);

pub const ETYMOLOGY_SOURCE: FieldSpec = FieldSpec::new(
    FieldKey::EtymologySource,
    &["etymology_source"],
    AbsentPolicy::Canonical,
);

pub const ETYMOLOGY_EXPLAIN: FieldSpec = FieldSpec::new(
    FieldKey::EtymologyExplain,
    &["etymology_explain"],
    AbsentPolicy::Canonical,
);

pub const ETYMOLOGY_SCORE: FieldSpec = FieldSpec::new(
    FieldKey::EtymologyScore,
    &["etymology_score"],
    AbsentPolicy::Canonical,
);

pub const ETYMOLOGY_MATCH: FieldSpec = FieldSpec::new(
    FieldKey::EtymologyMatch,
    &["etymology_match"],
    AbsentPolicy::Canonical,
);

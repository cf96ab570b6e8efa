//! Column aliases for the harvest writers

use nomen_common::airtable::{AbsentPolicy, FieldKey, FieldSpec};

pub const FULL_NAME: FieldSpec = FieldSpec::new(
    FieldKey::FullName,
    &["full_name", "Full Name", "Name", "fullname", "Full name", "title"],
    AbsentPolicy::Canonical,
);

pub const GIVEN_NAME: FieldSpec = FieldSpec::new(
    FieldKey::GivenName,
    &["given_name", "first_name", "First Name", "Given Name"],
    AbsentPolicy::Canonical,
);

pub const SURNAME: FieldSpec = FieldSpec::new(
    FieldKey::Surname,
    &["surname", "last_name", "Last Name", "Family Name"],
    AbsentPolicy::Canonical,
);

/// Harvest writes the canonical profession column
pub const PROFESSION: FieldSpec = FieldSpec::new(
    FieldKey::Occupation,
    &["profession_canonical", "Profession Canonical"],
    AbsentPolicy::Canonical,
);

pub const LANGUAGE_ORIGIN: FieldSpec = FieldSpec::new(
    FieldKey::Language,
    &["language_origin", "Language Origin"],
    AbsentPolicy::Canonical,
);

/// Upload only targets columns the table actually has
pub const UPLOAD_FULL_NAME: FieldSpec = FieldSpec::new(
    FieldKey::FullName,
    &["full_name", "Full Name", "Name", "fullname", "Full name", "title"],
    AbsentPolicy::Skip,
);

pub const UPLOAD_GIVEN_NAME: FieldSpec = FieldSpec::new(
    FieldKey::GivenName,
    &["given_name", "first_name", "First Name", "Given Name"],
    AbsentPolicy::Skip,
);

pub const UPLOAD_SURNAME: FieldSpec = FieldSpec::new(
    FieldKey::Surname,
    &["surname", "last_name", "Last Name", "Family Name"],
    AbsentPolicy::Skip,
);

pub const UPLOAD_OCCUPATION: FieldSpec = FieldSpec::new(
    FieldKey::Occupation,
    &[
        "occupation",
        "profession_canonical",
        "professional_canonical",
        "job",
        "role",
        "Role",
    ],
    AbsentPolicy::Skip,
);

pub const UPLOAD_CLUSTER: FieldSpec = FieldSpec::new(
    FieldKey::Cluster,
    &[
        "profession_cluster",
        "professional_cluster",
        "Profession Cluster",
        "cluster",
        "Cluster",
        "category",
        "Category",
    ],
    AbsentPolicy::Skip,
);

pub const UPLOAD_WIKIDATA_ID: FieldSpec = FieldSpec::new(
    FieldKey::WikidataId,
    &["wikidata_id", "Wikidata ID", "wikidata"],
    AbsentPolicy::Skip,
);

/// Every language-like column receives `--lang`
pub const LANGUAGE_ALIASES: &[&str] = &[
    "language",
    "language_origin",
    "language-origin",
    "Language Origin",
    "lang",
];

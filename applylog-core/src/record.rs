//! Application record schema.
//!
//! The same record appears in three shapes:
//!
//! - [`ApplicationFields`] / [`ApplicationPatch`]: what a client submits on create/update.
//! - [`ApplicationDocument`]: what is persisted (no identifier, BSON timestamp).
//! - [`ApplicationRecord`]: what is returned to clients (`_id` as a hex string).
//!
//! Enum membership, date syntax and URL syntax are enforced by the types during
//! deserialization. [`ApplicationFields::validate`] and [`ApplicationPatch::validate`]
//! add the checks a type cannot express (non-empty text, http(s)-only links).

use bson::{Bson, de::deserialize_from_bson, oid::ObjectId, ser::serialize_to_bson};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use url::Url;

use crate::{
    backend::GroupCount,
    document::Document,
    error::{ApplicationError, ApplicationResult, StoreError, StoreResult},
    query::{Expr, Filter},
};

/// Stored field names referenced by queries.
pub mod fields {
    pub const CATEGORY: &str = "category";
    pub const STATUS: &str = "status";
    pub const LAST_UPDATED: &str = "last_updated";
}

/// How the opening was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Campus,
    OffCampus,
    Hackathon,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Campus, Category::OffCampus, Category::Hackathon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Campus => "campus",
            Category::OffCampus => "off_campus",
            Category::Hackathon => "hackathon",
        }
    }
}

/// Where the application currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Applied,
    Test,
    Interview,
    Offer,
    Rejected,
    Withdrawn,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Status::Applied,
        Status::Test,
        Status::Interview,
        Status::Offer,
        Status::Rejected,
        Status::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Applied => "applied",
            Status::Test => "test",
            Status::Interview => "interview",
            Status::Offer => "offer",
            Status::Rejected => "rejected",
            Status::Withdrawn => "withdrawn",
        }
    }
}

macro_rules! impl_text_enum {
    ($ty:ident, $label:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ApplicationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .into_iter()
                    .find(|variant| variant.as_str() == s)
                    .ok_or_else(|| {
                        let allowed = $ty::ALL.map(|variant| variant.as_str()).join(", ");
                        ApplicationError::Validation(format!(
                            concat!("invalid ", $label, " '{}', expected one of: {}"),
                            s, allowed
                        ))
                    })
            }
        }
    };
}

impl_text_enum!(Category, "category");
impl_text_enum!(Status, "status");

/// The client-supplied content of a new application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationFields {
    pub company_name: String,
    pub role: String,
    pub category: Category,
    pub status: Status,
    pub date_applied: NaiveDate,
    #[serde(default)]
    pub important_dates: Option<BTreeMap<String, NaiveDate>>,
    #[serde(default)]
    pub links: Option<BTreeMap<String, Url>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ApplicationFields {
    /// Checks the constraints the field types cannot express.
    pub fn validate(&self) -> ApplicationResult<()> {
        require_text("company_name", &self.company_name)?;
        require_text("role", &self.role)?;
        if let Some(dates) = &self.important_dates {
            validate_labels("important_dates", dates.keys())?;
        }
        if let Some(links) = &self.links {
            validate_links(links)?;
        }

        Ok(())
    }
}

/// A partial update. `None` means "leave the stored value alone".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_applied: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub important_dates: Option<BTreeMap<String, NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<BTreeMap<String, Url>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ApplicationPatch {
    /// Returns true when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self == &ApplicationPatch::default()
    }

    /// Checks the supplied fields against the same rules as [`ApplicationFields::validate`].
    pub fn validate(&self) -> ApplicationResult<()> {
        if let Some(company_name) = &self.company_name {
            require_text("company_name", company_name)?;
        }
        if let Some(role) = &self.role {
            require_text("role", role)?;
        }
        if let Some(dates) = &self.important_dates {
            validate_labels("important_dates", dates.keys())?;
        }
        if let Some(links) = &self.links {
            validate_links(links)?;
        }

        Ok(())
    }

    /// Builds the `$set` body for this patch: every supplied field plus the new timestamp.
    pub fn to_set_document(&self, now: DateTime<Utc>) -> StoreResult<bson::Document> {
        let mut set = match serialize_to_bson(self)? {
            Bson::Document(document) => document,
            other => {
                return Err(StoreError::InvalidDocument(format!(
                    "expected patch to serialize to a document, got {:?}",
                    other.element_type()
                )));
            }
        };
        set.insert(fields::LAST_UPDATED, bson::DateTime::from_chrono(now));

        Ok(set)
    }
}

/// The persisted form of an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDocument {
    pub company_name: String,
    pub role: String,
    pub category: Category,
    pub status: Status,
    pub date_applied: NaiveDate,
    #[serde(default)]
    pub important_dates: Option<BTreeMap<String, NaiveDate>>,
    #[serde(default)]
    pub links: Option<BTreeMap<String, Url>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub last_updated: bson::DateTime,
}

impl Document for ApplicationDocument {
    fn collection_name() -> &'static str {
        "applications"
    }
}

impl ApplicationDocument {
    pub fn new(fields: ApplicationFields, now: DateTime<Utc>) -> Self {
        Self {
            company_name: fields.company_name,
            role: fields.role,
            category: fields.category,
            status: fields.status,
            date_applied: fields.date_applied,
            important_dates: fields.important_dates,
            links: fields.links,
            notes: fields.notes,
            last_updated: bson::DateTime::from_chrono(now),
        }
    }

    pub fn into_record(self, id: ObjectId) -> ApplicationRecord {
        ApplicationRecord {
            id: id.to_hex(),
            fields: ApplicationFields {
                company_name: self.company_name,
                role: self.role,
                category: self.category,
                status: self.status,
                date_applied: self.date_applied,
                important_dates: self.important_dates,
                links: self.links,
                notes: self.notes,
            },
            last_updated: self.last_updated.to_chrono(),
        }
    }
}

/// An application as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: ApplicationFields,
    pub last_updated: DateTime<Utc>,
}

/// Exact-match constraints for listing applications. Unset fields match anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub category: Option<Category>,
    pub status: Option<Status>,
}

impl ListFilter {
    /// Translates the filter into a store expression, or `None` when unconstrained.
    pub fn to_expr(&self) -> StoreResult<Option<Expr>> {
        let mut clauses = Vec::new();
        if let Some(category) = &self.category {
            clauses.push(Filter::eq(fields::CATEGORY, filter_value(category)?));
        }
        if let Some(status) = &self.status {
            clauses.push(Filter::eq(fields::STATUS, filter_value(status)?));
        }

        Ok(match clauses.len() {
            0 => None,
            1 => clauses.pop(),
            _ => Some(Filter::and(clauses)),
        })
    }
}

fn filter_value<T: Serialize>(value: &T) -> StoreResult<Bson> {
    match serialize_to_bson(value)? {
        value @ Bson::String(_) => Ok(value),
        other => Err(StoreError::InvalidQuery(format!(
            "filter values must serialize to strings, got {:?}",
            other.element_type()
        ))),
    }
}

/// The (category, status) pair records are grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatsKey {
    pub category: Category,
    pub status: Status,
}

/// Number of records sharing one (category, status) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    #[serde(rename = "_id")]
    pub key: StatsKey,
    pub count: u64,
}

impl StatusCount {
    pub fn from_group(group: GroupCount) -> StoreResult<Self> {
        Ok(Self {
            key: deserialize_from_bson(Bson::Document(group.key))?,
            count: group.count,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationStats {
    pub counts: Vec<StatusCount>,
}

fn require_text(field: &str, value: &str) -> ApplicationResult<()> {
    if value.trim().is_empty() {
        return Err(ApplicationError::Validation(format!("{field} must not be empty")));
    }

    Ok(())
}

fn validate_labels<'a>(field: &str, labels: impl Iterator<Item = &'a String>) -> ApplicationResult<()> {
    for label in labels {
        if label.trim().is_empty() {
            return Err(ApplicationError::Validation(format!("{field} labels must not be empty")));
        }
    }

    Ok(())
}

fn validate_links(links: &BTreeMap<String, Url>) -> ApplicationResult<()> {
    validate_labels("links", links.keys())?;
    for (label, url) in links {
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(ApplicationError::Validation(format!(
                "links.{label} must be an http(s) URL, got '{url}'"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use chrono::TimeZone;
    use serde_json::json;

    fn acme() -> ApplicationFields {
        serde_json::from_value(json!({
            "company_name": "Acme",
            "role": "SWE",
            "category": "campus",
            "status": "applied",
            "date_applied": "2024-01-10"
        }))
        .unwrap()
    }

    #[test]
    fn enums_use_snake_case_on_the_wire() {
        assert_eq!(serde_json::to_value(Category::OffCampus).unwrap(), json!("off_campus"));
        assert_eq!("off_campus".parse::<Category>().unwrap(), Category::OffCampus);
        assert_eq!(Status::Withdrawn.to_string(), "withdrawn");
        assert!(matches!("pending".parse::<Status>(), Err(ApplicationError::Validation(_))));
    }

    #[test]
    fn unknown_enum_values_are_rejected_on_deserialize() {
        let result = serde_json::from_value::<ApplicationFields>(json!({
            "company_name": "Acme",
            "role": "SWE",
            "category": "bootcamp",
            "status": "applied",
            "date_applied": "2024-01-10"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn malformed_dates_and_urls_are_rejected_on_deserialize() {
        let bad_date = json!({
            "company_name": "Acme", "role": "SWE", "category": "campus",
            "status": "applied", "date_applied": "10/01/2024"
        });
        assert!(serde_json::from_value::<ApplicationFields>(bad_date).is_err());

        let bad_url = json!({
            "company_name": "Acme", "role": "SWE", "category": "campus",
            "status": "applied", "date_applied": "2024-01-10",
            "links": { "portal": "not a url" }
        });
        assert!(serde_json::from_value::<ApplicationFields>(bad_url).is_err());
    }

    #[test]
    fn validate_rejects_blank_text_and_non_http_links() {
        assert!(acme().validate().is_ok());

        let mut blank = acme();
        blank.company_name = "   ".into();
        assert!(matches!(blank.validate(), Err(ApplicationError::Validation(_))));

        let mut ftp = acme();
        ftp.links = Some(BTreeMap::from([(
            "files".to_string(),
            Url::parse("ftp://example.com/cv.pdf").unwrap(),
        )]));
        assert!(matches!(ftp.validate(), Err(ApplicationError::Validation(_))));
    }

    #[test]
    fn patch_with_only_nulls_is_empty() {
        let patch: ApplicationPatch =
            serde_json::from_value(json!({ "status": null, "notes": null, "unknown": 1 })).unwrap();
        assert!(patch.is_empty());

        let patch: ApplicationPatch = serde_json::from_value(json!({ "status": "offer" })).unwrap();
        assert!(!patch.is_empty());
    }

    #[test]
    fn patch_set_document_holds_only_supplied_fields() {
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 30, 0).unwrap();
        let patch = ApplicationPatch { status: Some(Status::Interview), ..Default::default() };

        let set = patch.to_set_document(now).unwrap();

        assert_eq!(
            set,
            doc! {
                "status": "interview",
                "last_updated": bson::DateTime::from_chrono(now),
            }
        );
    }

    #[test]
    fn document_round_trips_into_record() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let id = ObjectId::new();

        let record = ApplicationDocument::new(acme(), now).into_record(id);

        assert_eq!(record.id, id.to_hex());
        assert_eq!(record.fields, acme());
        assert_eq!(record.last_updated, now);
    }

    #[test]
    fn record_serializes_with_mongo_style_id() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        let record = ApplicationDocument::new(acme(), now).into_record(ObjectId::new());

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["_id"], json!(record.id));
        assert_eq!(value["company_name"], json!("Acme"));
        assert_eq!(value["date_applied"], json!("2024-01-10"));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn list_filter_translates_to_exact_matches() {
        assert_eq!(ListFilter::default().to_expr().unwrap(), None);

        let category_only = ListFilter { category: Some(Category::Hackathon), status: None };
        assert_eq!(
            category_only.to_expr().unwrap(),
            Some(Filter::eq("category", "hackathon"))
        );

        let both = ListFilter { category: Some(Category::Campus), status: Some(Status::Offer) };
        assert_eq!(
            both.to_expr().unwrap(),
            Some(Filter::and([Filter::eq("category", "campus"), Filter::eq("status", "offer")]))
        );
    }

    #[test]
    fn status_count_decodes_group_key() {
        let group = GroupCount { key: doc! { "category": "campus", "status": "applied" }, count: 2 };

        let count = StatusCount::from_group(group).unwrap();

        assert_eq!(count.key, StatsKey { category: Category::Campus, status: Status::Applied });
        assert_eq!(count.count, 2);
        assert_eq!(
            serde_json::to_value(&count).unwrap(),
            json!({ "_id": { "category": "campus", "status": "applied" }, "count": 2 })
        );
    }
}

use time::OffsetDateTime;

use crate::{
    error::AppError,
    listing::{day_end, day_start, non_empty, SortOrder},
    systems::dto::SystemListParams,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemSortField {
    Id,
    Name,
    Location,
    #[default]
    CreatedAt,
}

impl SystemSortField {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw {
            None | Some("created_at") => Ok(Self::CreatedAt),
            Some("id") => Ok(Self::Id),
            Some("name") => Ok(Self::Name),
            Some("location") => Ok(Self::Location),
            Some(_) => Err(AppError::BadRequest(
                "Invalid value for 'sort_by'. Use one of: id, name, location, created_at.".into(),
            )),
        }
    }

    /// Text keys sort on their lower-cased code points, whatever the
    /// database collation.
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => r#"lower(name) COLLATE "C""#,
            Self::Location => r#"lower(location) COLLATE "C""#,
            Self::CreatedAt => "created_at",
        }
    }
}

/// Typed form of the system-list query string. Every `Some` is one more
/// AND-ed predicate on top of the owner scope.
#[derive(Debug, Clone, Default)]
pub struct SystemQuery {
    pub name: Option<String>,
    pub location: Option<String>,
    /// `created_at >= created_from`
    pub created_from: Option<OffsetDateTime>,
    /// `created_at < created_until`
    pub created_until: Option<OffsetDateTime>,
    pub sort: SystemSortField,
    pub order: SortOrder,
}

const INVALID_DATE: &str = "Invalid date format. Expected format: YYYY-MM-DD.";

impl SystemQuery {
    pub fn from_params(params: &SystemListParams) -> Result<Self, AppError> {
        let invalid = || AppError::BadRequest(INVALID_DATE.into());
        let created_from = non_empty(&params.created_after)
            .map(|raw| day_start(raw).ok_or_else(invalid))
            .transpose()?;
        let created_until = non_empty(&params.created_before)
            .map(|raw| day_end(raw).ok_or_else(invalid))
            .transpose()?;

        Ok(Self {
            name: non_empty(&params.name).map(str::to_string),
            location: non_empty(&params.location).map(str::to_string),
            created_from,
            created_until,
            sort: SystemSortField::parse(params.sort_by.as_deref())?,
            order: SortOrder::parse(params.sort_order.as_deref())?,
        })
    }
}

//! Module containg membership tier and membership application models
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use errors::Error;
use models::{ApplicationStatus, User};
use schema::membership_applications;

/// Paid membership tiers a supplier company can hold
#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum MembershipTier {
    Platinum,
    Gold,
    Silver,
    Starter,
}

impl FromStr for MembershipTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "platinum" => Ok(MembershipTier::Platinum),
            "gold" => Ok(MembershipTier::Gold),
            "silver" => Ok(MembershipTier::Silver),
            "starter" => Ok(MembershipTier::Starter),
            _ => Err(Error::Parse),
        }
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            MembershipTier::Platinum => write!(f, "platinum"),
            MembershipTier::Gold => write!(f, "gold"),
            MembershipTier::Silver => write!(f, "silver"),
            MembershipTier::Starter => write!(f, "starter"),
        }
    }
}

/// Payload for querying membership applications
#[derive(Debug, Serialize, Deserialize, Queryable, Clone, Identifiable)]
#[serde(rename_all = "camelCase")]
pub struct MembershipApplication {
    pub id: i32,
    pub user_id: i32,
    pub company_name: String,
    pub requested_tier: MembershipTier,
    pub message: Option<String>,
    pub status: ApplicationStatus,
    pub reviewer_id: Option<i32>,
    pub reviewed_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating membership applications
#[derive(Serialize, Deserialize, Insertable, Validate, Clone, Debug)]
#[serde(rename_all = "camelCase")]
#[table_name = "membership_applications"]
pub struct NewMembershipApplication {
    pub user_id: i32,
    #[validate(length(min = "1", message = "Company name must not be empty"))]
    pub company_name: String,
    pub requested_tier: MembershipTier,
    pub message: Option<String>,
}

/// Payload for reviewing membership applications
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationDecision {
    Approve,
    Reject,
}

/// Wire payload carrying a review decision
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct ReviewPayload {
    pub decision: ApplicationDecision,
}

/// Changeset stamped onto an application when it is reviewed
#[derive(AsChangeset, Debug)]
#[table_name = "membership_applications"]
pub struct ReviewedApplication {
    pub status: ApplicationStatus,
    pub reviewer_id: i32,
    pub reviewed_at: NaiveDateTime,
}

/// Filters for listing membership applications
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct ApplicationsSearchTerms {
    pub status: Option<ApplicationStatus>,
}

/// Wire representation of an application with its applicant attached
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MembershipApplicationListItem {
    pub id: i32,
    pub user_id: i32,
    pub user_email: String,
    pub user_name: String,
    pub company_name: String,
    pub requested_tier: MembershipTier,
    pub status: ApplicationStatus,
    pub submitted_at: NaiveDateTime,
    pub reviewed_at: Option<NaiveDateTime>,
    pub reviewer_id: Option<i32>,
}

impl MembershipApplicationListItem {
    pub fn new(application: MembershipApplication, user: User) -> Self {
        Self {
            id: application.id,
            user_id: application.user_id,
            user_email: user.email,
            user_name: user.name,
            company_name: application.company_name,
            requested_tier: application.requested_tier,
            status: application.status,
            submitted_at: application.created_at,
            reviewed_at: application.reviewed_at,
            reviewer_id: application.reviewer_id,
        }
    }
}

// The tier is stored in a nullable varchar column, so unlike the status
// enums it maps through `FromSql`, which diesel lifts to `Option<T>` for
// `Nullable<VarChar>` reads.
mod diesel_impl {
    use std::error::Error;
    use std::io::Write;
    use std::str;

    use diesel::deserialize::{self, Queryable};
    use diesel::expression::bound::Bound;
    use diesel::expression::AsExpression;
    use diesel::pg::Pg;
    use diesel::row::Row;
    use diesel::serialize::Output;
    use diesel::sql_types::Nullable;
    use diesel::sql_types::VarChar;
    use diesel::types::{FromSql, FromSqlRow, IsNull, NotNull, SingleValue, ToSql};

    use super::MembershipTier;

    impl NotNull for MembershipTier {}
    impl SingleValue for MembershipTier {}

    impl FromSql<VarChar, Pg> for MembershipTier {
        fn from_sql(bytes: Option<&[u8]>) -> deserialize::Result<Self> {
            match bytes {
                Some(b"platinum") => Ok(MembershipTier::Platinum),
                Some(b"gold") => Ok(MembershipTier::Gold),
                Some(b"silver") => Ok(MembershipTier::Silver),
                Some(b"starter") => Ok(MembershipTier::Starter),
                Some(value) => Err(format!(
                    "Unrecognized enum variant for MembershipTier: {}",
                    str::from_utf8(value).unwrap_or("unreadable value")
                ).into()),
                None => Err("Unexpected null for non-null column `membership_tier`".into()),
            }
        }
    }

    impl FromSqlRow<VarChar, Pg> for MembershipTier {
        fn build_from_row<R: Row<Pg>>(row: &mut R) -> Result<Self, Box<Error + Send + Sync>> {
            FromSql::<VarChar, Pg>::from_sql(row.take())
        }
    }

    impl Queryable<VarChar, Pg> for MembershipTier {
        type Row = MembershipTier;
        fn build(row: Self::Row) -> Self {
            row
        }
    }

    impl ToSql<VarChar, Pg> for MembershipTier {
        fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> Result<IsNull, Box<Error + Send + Sync>> {
            match *self {
                MembershipTier::Platinum => out.write_all(b"platinum")?,
                MembershipTier::Gold => out.write_all(b"gold")?,
                MembershipTier::Silver => out.write_all(b"silver")?,
                MembershipTier::Starter => out.write_all(b"starter")?,
            }
            Ok(IsNull::No)
        }
    }

    impl ToSql<Nullable<VarChar>, Pg> for MembershipTier {
        fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> Result<IsNull, Box<Error + Send + Sync>> {
            ToSql::<VarChar, Pg>::to_sql(self, out)
        }
    }

    impl AsExpression<VarChar> for MembershipTier {
        type Expression = Bound<VarChar, MembershipTier>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl<'a> AsExpression<VarChar> for &'a MembershipTier {
        type Expression = Bound<VarChar, &'a MembershipTier>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl AsExpression<Nullable<VarChar>> for MembershipTier {
        type Expression = Bound<Nullable<VarChar>, MembershipTier>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl<'a> AsExpression<Nullable<VarChar>> for &'a MembershipTier {
        type Expression = Bound<Nullable<VarChar>, &'a MembershipTier>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }
}

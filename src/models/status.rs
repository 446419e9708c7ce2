//! Enums for statuses of products, rfqs, rfq responses and membership applications
use std::fmt;
use std::str::FromStr;

use errors::Error;

#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Inactive,
    Pending,
}

impl FromStr for ProductStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            "pending" => Ok(ProductStatus::Pending),
            _ => Err(Error::Parse),
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ProductStatus::Active => write!(f, "active"),
            ProductStatus::Inactive => write!(f, "inactive"),
            ProductStatus::Pending => write!(f, "pending"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RfqStatus {
    Open,
    Closed,
    Awarded,
    Cancelled,
}

impl FromStr for RfqStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(RfqStatus::Open),
            "closed" => Ok(RfqStatus::Closed),
            "awarded" => Ok(RfqStatus::Awarded),
            "cancelled" => Ok(RfqStatus::Cancelled),
            _ => Err(Error::Parse),
        }
    }
}

impl fmt::Display for RfqStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RfqStatus::Open => write!(f, "open"),
            RfqStatus::Closed => write!(f, "closed"),
            RfqStatus::Awarded => write!(f, "awarded"),
            RfqStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum RfqResponseStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for RfqResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RfqResponseStatus::Pending => write!(f, "pending"),
            RfqResponseStatus::Accepted => write!(f, "accepted"),
            RfqResponseStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

impl FromStr for ApplicationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            _ => Err(Error::Parse),
        }
    }
}

mod diesel_impl {
    use std::error::Error;
    use std::io::Write;
    use std::str;

    use diesel::deserialize::Queryable;
    use diesel::expression::bound::Bound;
    use diesel::expression::AsExpression;
    use diesel::pg::Pg;
    use diesel::row::Row;
    use diesel::serialize::Output;
    use diesel::sql_types::VarChar;
    use diesel::types::{FromSqlRow, IsNull, NotNull, SingleValue, ToSql};

    use super::{ApplicationStatus, ProductStatus, RfqResponseStatus, RfqStatus};

    impl NotNull for ProductStatus {}
    impl SingleValue for ProductStatus {}

    impl FromSqlRow<VarChar, Pg> for ProductStatus {
        fn build_from_row<R: Row<Pg>>(row: &mut R) -> Result<Self, Box<Error + Send + Sync>> {
            match row.take() {
                Some(b"active") => Ok(ProductStatus::Active),
                Some(b"inactive") => Ok(ProductStatus::Inactive),
                Some(b"pending") => Ok(ProductStatus::Pending),
                Some(value) => Err(format!(
                    "Unrecognized enum variant for ProductStatus: {}",
                    str::from_utf8(value).unwrap_or("unreadable value")
                ).into()),
                None => Err("Unexpected null for non-null column `status`".into()),
            }
        }
    }

    impl Queryable<VarChar, Pg> for ProductStatus {
        type Row = ProductStatus;
        fn build(row: Self::Row) -> Self {
            row
        }
    }

    impl ToSql<VarChar, Pg> for ProductStatus {
        fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> Result<IsNull, Box<Error + Send + Sync>> {
            match *self {
                ProductStatus::Active => out.write_all(b"active")?,
                ProductStatus::Inactive => out.write_all(b"inactive")?,
                ProductStatus::Pending => out.write_all(b"pending")?,
            }
            Ok(IsNull::No)
        }
    }

    impl AsExpression<VarChar> for ProductStatus {
        type Expression = Bound<VarChar, ProductStatus>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl<'a> AsExpression<VarChar> for &'a ProductStatus {
        type Expression = Bound<VarChar, &'a ProductStatus>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl NotNull for RfqStatus {}
    impl SingleValue for RfqStatus {}

    impl FromSqlRow<VarChar, Pg> for RfqStatus {
        fn build_from_row<R: Row<Pg>>(row: &mut R) -> Result<Self, Box<Error + Send + Sync>> {
            match row.take() {
                Some(b"open") => Ok(RfqStatus::Open),
                Some(b"closed") => Ok(RfqStatus::Closed),
                Some(b"awarded") => Ok(RfqStatus::Awarded),
                Some(b"cancelled") => Ok(RfqStatus::Cancelled),
                Some(value) => Err(format!(
                    "Unrecognized enum variant for RfqStatus: {}",
                    str::from_utf8(value).unwrap_or("unreadable value")
                ).into()),
                None => Err("Unexpected null for non-null column `status`".into()),
            }
        }
    }

    impl Queryable<VarChar, Pg> for RfqStatus {
        type Row = RfqStatus;
        fn build(row: Self::Row) -> Self {
            row
        }
    }

    impl ToSql<VarChar, Pg> for RfqStatus {
        fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> Result<IsNull, Box<Error + Send + Sync>> {
            match *self {
                RfqStatus::Open => out.write_all(b"open")?,
                RfqStatus::Closed => out.write_all(b"closed")?,
                RfqStatus::Awarded => out.write_all(b"awarded")?,
                RfqStatus::Cancelled => out.write_all(b"cancelled")?,
            }
            Ok(IsNull::No)
        }
    }

    impl AsExpression<VarChar> for RfqStatus {
        type Expression = Bound<VarChar, RfqStatus>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl<'a> AsExpression<VarChar> for &'a RfqStatus {
        type Expression = Bound<VarChar, &'a RfqStatus>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl NotNull for RfqResponseStatus {}
    impl SingleValue for RfqResponseStatus {}

    impl FromSqlRow<VarChar, Pg> for RfqResponseStatus {
        fn build_from_row<R: Row<Pg>>(row: &mut R) -> Result<Self, Box<Error + Send + Sync>> {
            match row.take() {
                Some(b"pending") => Ok(RfqResponseStatus::Pending),
                Some(b"accepted") => Ok(RfqResponseStatus::Accepted),
                Some(b"rejected") => Ok(RfqResponseStatus::Rejected),
                Some(value) => Err(format!(
                    "Unrecognized enum variant for RfqResponseStatus: {}",
                    str::from_utf8(value).unwrap_or("unreadable value")
                ).into()),
                None => Err("Unexpected null for non-null column `status`".into()),
            }
        }
    }

    impl Queryable<VarChar, Pg> for RfqResponseStatus {
        type Row = RfqResponseStatus;
        fn build(row: Self::Row) -> Self {
            row
        }
    }

    impl ToSql<VarChar, Pg> for RfqResponseStatus {
        fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> Result<IsNull, Box<Error + Send + Sync>> {
            match *self {
                RfqResponseStatus::Pending => out.write_all(b"pending")?,
                RfqResponseStatus::Accepted => out.write_all(b"accepted")?,
                RfqResponseStatus::Rejected => out.write_all(b"rejected")?,
            }
            Ok(IsNull::No)
        }
    }

    impl AsExpression<VarChar> for RfqResponseStatus {
        type Expression = Bound<VarChar, RfqResponseStatus>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl<'a> AsExpression<VarChar> for &'a RfqResponseStatus {
        type Expression = Bound<VarChar, &'a RfqResponseStatus>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl NotNull for ApplicationStatus {}
    impl SingleValue for ApplicationStatus {}

    impl FromSqlRow<VarChar, Pg> for ApplicationStatus {
        fn build_from_row<R: Row<Pg>>(row: &mut R) -> Result<Self, Box<Error + Send + Sync>> {
            match row.take() {
                Some(b"pending") => Ok(ApplicationStatus::Pending),
                Some(b"approved") => Ok(ApplicationStatus::Approved),
                Some(b"rejected") => Ok(ApplicationStatus::Rejected),
                Some(value) => Err(format!(
                    "Unrecognized enum variant for ApplicationStatus: {}",
                    str::from_utf8(value).unwrap_or("unreadable value")
                ).into()),
                None => Err("Unexpected null for non-null column `status`".into()),
            }
        }
    }

    impl Queryable<VarChar, Pg> for ApplicationStatus {
        type Row = ApplicationStatus;
        fn build(row: Self::Row) -> Self {
            row
        }
    }

    impl ToSql<VarChar, Pg> for ApplicationStatus {
        fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> Result<IsNull, Box<Error + Send + Sync>> {
            match *self {
                ApplicationStatus::Pending => out.write_all(b"pending")?,
                ApplicationStatus::Approved => out.write_all(b"approved")?,
                ApplicationStatus::Rejected => out.write_all(b"rejected")?,
            }
            Ok(IsNull::No)
        }
    }

    impl AsExpression<VarChar> for ApplicationStatus {
        type Expression = Bound<VarChar, ApplicationStatus>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl<'a> AsExpression<VarChar> for &'a ApplicationStatus {
        type Expression = Bound<VarChar, &'a ApplicationStatus>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }
}

//! Enum for user roles used by the ACL layer
use std::fmt;
use std::str::FromStr;

use errors::Error;

#[derive(Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Supplier,
    Buyer,
}

impl FromStr for UserRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "supplier" => Ok(UserRole::Supplier),
            "buyer" => Ok(UserRole::Buyer),
            _ => Err(Error::Parse),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Supplier => write!(f, "supplier"),
            UserRole::Buyer => write!(f, "buyer"),
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

    use super::UserRole;

    impl NotNull for UserRole {}
    impl SingleValue for UserRole {}

    impl FromSqlRow<VarChar, Pg> for UserRole {
        fn build_from_row<R: Row<Pg>>(row: &mut R) -> Result<Self, Box<Error + Send + Sync>> {
            match row.take() {
                Some(b"admin") => Ok(UserRole::Admin),
                Some(b"supplier") => Ok(UserRole::Supplier),
                Some(b"buyer") => Ok(UserRole::Buyer),
                Some(value) => Err(format!(
                    "Unrecognized enum variant for UserRole: {}",
                    str::from_utf8(value).unwrap_or("unreadable value")
                ).into()),
                None => Err("Unexpected null for non-null column `role`".into()),
            }
        }
    }

    impl Queryable<VarChar, Pg> for UserRole {
        type Row = UserRole;
        fn build(row: Self::Row) -> Self {
            row
        }
    }

    impl ToSql<VarChar, Pg> for UserRole {
        fn to_sql<W: Write>(&self, out: &mut Output<W, Pg>) -> Result<IsNull, Box<Error + Send + Sync>> {
            match *self {
                UserRole::Admin => out.write_all(b"admin")?,
                UserRole::Supplier => out.write_all(b"supplier")?,
                UserRole::Buyer => out.write_all(b"buyer")?,
            }
            Ok(IsNull::No)
        }
    }

    impl AsExpression<VarChar> for UserRole {
        type Expression = Bound<VarChar, UserRole>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }

    impl<'a> AsExpression<VarChar> for &'a UserRole {
        type Expression = Bound<VarChar, &'a UserRole>;
        fn as_expression(self) -> Self::Expression {
            Bound::new(self)
        }
    }
}

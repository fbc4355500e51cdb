use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ErrorCode, StoreError};

/// Email used when no employee session is available (preview/dev contexts).
pub const DEFAULT_EMPLOYEE_EMAIL: &str = "employee@test.tld";

/// VAT percentage applied when the form leaves it blank or non-numeric.
pub const DEFAULT_PCT: i64 = 20;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(BillId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "pending" => Ok(BillStatus::Pending),
            "accepted" => Ok(BillStatus::Accepted),
            "refused" => Ok(BillStatus::Refused),
            other => Err(StoreError::new(
                ErrorCode::Validation,
                format!("unknown bill status '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserType {
    Employee,
    Admin,
    #[serde(other)]
    Other,
}

/// Persisted user record as written by the login page under the `user` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(rename = "type", default)]
    pub user_type: Option<UserType>,
}

impl UserSession {
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            user_type: Some(UserType::Employee),
        }
    }
}

/// Expense-report record as held by the bill store.
///
/// `status` is kept as the store's raw string: records written by other
/// clients may carry values outside [`BillStatus`], and those must still be
/// listed. `amount` is `None` when the submitted amount did not parse; it
/// serializes as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    #[serde(default)]
    pub id: Option<BillId>,
    pub email: String,
    #[serde(rename = "type")]
    pub expense_type: String,
    pub name: String,
    #[serde(default)]
    pub amount: Option<i64>,
    pub date: String,
    #[serde(default)]
    pub vat: String,
    #[serde(default = "default_pct")]
    pub pct: i64,
    #[serde(default)]
    pub commentary: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    pub status: String,
}

fn default_pct() -> i64 {
    DEFAULT_PCT
}

impl Bill {
    pub fn parsed_status(&self) -> Result<BillStatus, StoreError> {
        self.status.parse()
    }
}

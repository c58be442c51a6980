use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

pub type UserNick = String;
pub type MemberId = String;

fn default_weight() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub left: bool,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, name: impl Into<String>) -> Self {
        Member {
            id: id.into(),
            name: name.into(),
            weight: default_weight(),
            left: false,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MemberWeight {
    pub member_id: MemberId,
    pub weight: f64,
}

/// How an expense is divided among the members eligible for it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(tag = "method", content = "weights", rename_all = "lowercase")]
pub enum SplitMethod {
    #[default]
    Equal,
    /// Ordered weight map. Members missing from it fall back to their own weight.
    Weight(Vec<MemberWeight>),
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Expense {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub paid_by: MemberId,
    #[serde(default)]
    pub split: SplitMethod,
    /// Members active in the trip when the expense was recorded. Older
    /// documents lack it, in which case every member is eligible.
    #[serde(default)]
    pub member_ids_at_creation: Option<Vec<MemberId>>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Advance {
    pub id: String,
    pub amount: f64,
    pub paid_by: MemberId,
    pub paid_to: MemberId,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Trip {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub advances: Vec<Advance>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewMember {
    pub id: MemberId,
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewExpense {
    pub name: String,
    pub amount: f64,
    pub paid_by: MemberId,
    #[serde(default)]
    pub split: SplitMethod,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewAdvance {
    pub amount: f64,
    pub paid_by: MemberId,
    pub paid_to: MemberId,
}

impl Trip {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Trip {
            id: id.into(),
            name: name.into(),
            members: vec![],
            expenses: vec![],
            advances: vec![],
        }
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn active_member_ids(&self) -> Vec<MemberId> {
        self.members
            .iter()
            .filter(|member| !member.left)
            .map(|member| member.id.clone())
            .collect()
    }

    pub fn admit_member(&self, new_member: NewMember) -> Result<Member, ValidationError> {
        validation::check_new_member(self, &new_member)?;
        Ok(Member::new(new_member.id, new_member.name).with_weight(new_member.weight))
    }

    /// Builds the expense document, freezing the currently active members as
    /// the ones responsible for it.
    pub fn record_expense(&self, new_expense: NewExpense) -> Result<Expense, ValidationError> {
        validation::check_new_expense(self, &new_expense)?;
        Ok(Expense {
            id: ObjectId::new().to_hex(),
            name: new_expense.name,
            amount: new_expense.amount,
            paid_by: new_expense.paid_by,
            split: new_expense.split,
            member_ids_at_creation: Some(self.active_member_ids()),
            created_at: Utc::now(),
        })
    }

    pub fn record_advance(&self, new_advance: NewAdvance) -> Result<Advance, ValidationError> {
        validation::check_new_advance(self, &new_advance)?;
        Ok(Advance {
            id: ObjectId::new().to_hex(),
            amount: new_advance.amount,
            paid_by: new_advance.paid_by,
            paid_to: new_advance.paid_to,
            created_at: Utc::now(),
        })
    }
}

/// JSON shape of an expense. Dates are RFC 3339 strings here, while the
/// stored documents keep BSON datetimes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpenseView {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub paid_by: MemberId,
    pub split: SplitMethod,
    pub member_ids_at_creation: Option<Vec<MemberId>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AdvanceView {
    pub id: String,
    pub amount: f64,
    pub paid_by: MemberId,
    pub paid_to: MemberId,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TripView {
    pub id: String,
    pub name: String,
    pub members: Vec<Member>,
    pub expenses: Vec<ExpenseView>,
    pub advances: Vec<AdvanceView>,
}

impl From<Expense> for ExpenseView {
    fn from(expense: Expense) -> Self {
        ExpenseView {
            id: expense.id,
            name: expense.name,
            amount: expense.amount,
            paid_by: expense.paid_by,
            split: expense.split,
            member_ids_at_creation: expense.member_ids_at_creation,
            created_at: expense.created_at,
        }
    }
}

impl From<Advance> for AdvanceView {
    fn from(advance: Advance) -> Self {
        AdvanceView {
            id: advance.id,
            amount: advance.amount,
            paid_by: advance.paid_by,
            paid_to: advance.paid_to,
            created_at: advance.created_at,
        }
    }
}

impl From<Trip> for TripView {
    fn from(trip: Trip) -> Self {
        TripView {
            id: trip.id,
            name: trip.name,
            members: trip.members,
            expenses: trip.expenses.into_iter().map(ExpenseView::from).collect(),
            advances: trip.advances.into_iter().map(AdvanceView::from).collect(),
        }
    }
}

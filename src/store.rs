use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::schemas::{Advance, Expense, Member, Trip};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct TripSummary {
    pub id: String,
    pub name: String,
}

/// One document per trip, members, expenses and advances embedded.
#[derive(Clone)]
pub struct TripStore {
    trips: Collection<Trip>,
}

fn creation_error(error: mongodb::error::Error, trip_id: &str) -> AppError {
    let duplicate = matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    );
    if duplicate {
        AppError::Conflict(format!("trip {trip_id} already exists"))
    } else {
        AppError::Database(error)
    }
}

impl TripStore {
    /// Trip ids are unique, enforced by an index created here.
    pub async fn connect(client: &Client, database: &str) -> AppResult<Self> {
        let trips: Collection<Trip> = client.database(database).collection("Trips");
        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        trips.create_index(index, None).await?;
        Ok(TripStore { trips })
    }

    pub async fn create(&self, trip: &Trip) -> AppResult<()> {
        self.trips
            .insert_one(trip, None)
            .await
            .map_err(|error| creation_error(error, &trip.id))?;
        info!(trip = %trip.id, "trip created");
        Ok(())
    }

    pub async fn find(&self, id: &str) -> AppResult<Trip> {
        self.trips
            .find_one(doc! { "id": id }, None)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("trip {id}")))
    }

    pub async fn list(&self) -> AppResult<Vec<TripSummary>> {
        let options = FindOptions::builder()
            .projection(doc! { "id": 1, "name": 1, "_id": 0 })
            .sort(doc! { "name": 1 })
            .build();
        let cursor = self
            .trips
            .clone_with_type::<TripSummary>()
            .find(None, options)
            .await?;
        let trips: Vec<TripSummary> = cursor.try_collect().await?;
        Ok(trips)
    }

    pub async fn push_member(&self, trip_id: &str, member: &Member) -> AppResult<()> {
        let update = doc! { "$push": { "members": bson::to_bson(member)? } };
        self.update(doc! { "id": trip_id }, update, trip_id).await?;
        info!(trip = %trip_id, member = %member.id, "member added");
        Ok(())
    }

    /// Members are never deleted, they keep owing what they shared before leaving.
    pub async fn mark_member_left(&self, trip_id: &str, member_id: &str) -> AppResult<()> {
        self.update(
            doc! { "id": trip_id, "members.id": member_id },
            doc! { "$set": { "members.$.left": true } },
            &format!("member {member_id} in trip {trip_id}"),
        )
        .await?;
        info!(trip = %trip_id, member = %member_id, "member left");
        Ok(())
    }

    pub async fn push_expense(&self, trip_id: &str, expense: &Expense) -> AppResult<()> {
        let update = doc! { "$push": { "expenses": bson::to_bson(expense)? } };
        self.update(doc! { "id": trip_id }, update, trip_id).await?;
        info!(trip = %trip_id, expense = %expense.id, amount = expense.amount, "expense added");
        Ok(())
    }

    pub async fn delete_expense(&self, trip_id: &str, expense_id: &str) -> AppResult<()> {
        self.update(
            doc! { "id": trip_id, "expenses.id": expense_id },
            doc! { "$pull": { "expenses": { "id": expense_id } } },
            &format!("expense {expense_id} in trip {trip_id}"),
        )
        .await?;
        info!(trip = %trip_id, expense = %expense_id, "expense deleted");
        Ok(())
    }

    pub async fn push_advance(&self, trip_id: &str, advance: &Advance) -> AppResult<()> {
        let update = doc! { "$push": { "advances": bson::to_bson(advance)? } };
        self.update(doc! { "id": trip_id }, update, trip_id).await?;
        info!(trip = %trip_id, advance = %advance.id, amount = advance.amount, "advance added");
        Ok(())
    }

    pub async fn delete_advance(&self, trip_id: &str, advance_id: &str) -> AppResult<()> {
        self.update(
            doc! { "id": trip_id, "advances.id": advance_id },
            doc! { "$pull": { "advances": { "id": advance_id } } },
            &format!("advance {advance_id} in trip {trip_id}"),
        )
        .await?;
        info!(trip = %trip_id, advance = %advance_id, "advance deleted");
        Ok(())
    }

    async fn update(&self, filter: Document, update: Document, what: &str) -> AppResult<()> {
        let result = self.trips.update_one(filter, update, None).await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound(what.to_string()));
        }
        Ok(())
    }
}

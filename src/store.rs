use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait, sea_query::Expr,
};

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{Movie, NewMovie},
};

/// Sole owner of the movie table.
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All movies, ascending by rating. Equal ratings fall back to id order.
    pub async fn list_all(&self) -> AppResult<Vec<Movie>> {
        let rows = movie::Entity::find()
            .order_by_asc(movie::Column::Rating)
            .order_by_asc(movie::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    pub async fn get(&self, id: i32) -> AppResult<Option<Movie>> {
        let row = movie::Entity::find_by_id(id).one(&self.db).await?;
        Ok(row.map(Movie::from))
    }

    pub async fn insert(&self, new: NewMovie) -> AppResult<Movie> {
        let mut clash = Condition::any().add(movie::Column::Title.eq(new.title.as_str()));
        if let Some(id) = new.id {
            clash = clash.add(movie::Column::Id.eq(id));
        }
        if let Some(existing) = movie::Entity::find().filter(clash).one(&self.db).await? {
            return Err(conflict(&new, &existing));
        }

        let model = movie::ActiveModel {
            id: new.id.map(Set).unwrap_or(NotSet),
            title: Set(new.title.clone()),
            year: Set(new.year),
            description: Set(new.description),
            rating: Set(new.rating),
            ranking: Set(new.ranking),
            review: Set(new.review),
            img_url: Set(new.img_url),
        };

        match model.insert(&self.db).await {
            Ok(row) => {
                tracing::debug!(movie_id = row.id, title = %row.title, "movie inserted");
                Ok(row.into())
            },
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::Conflict(format!(
                    "\"{}\" is already in your collection",
                    new.title
                ))),
                _ => Err(err.into()),
            },
        }
    }

    /// Overwrites the mutable fields (rating, review, ranking) of an existing movie.
    pub async fn update(&self, movie: &Movie) -> AppResult<()> {
        let model = movie::ActiveModel {
            id: Set(movie.id),
            rating: Set(movie.rating),
            ranking: Set(movie.ranking),
            review: Set(movie.review.clone()),
            ..Default::default()
        };

        match model.update(&self.db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => Err(AppError::NotFound(movie.id)),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i32) -> AppResult<bool> {
        let res = movie::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    /// Persists the ranks of a ranking pass in one transaction.
    pub async fn save_rankings(&self, movies: &[Movie]) -> AppResult<()> {
        let txn = self.db.begin().await?;

        for m in movies {
            movie::Entity::update_many()
                .col_expr(movie::Column::Ranking, Expr::value(m.ranking))
                .filter(movie::Column::Id.eq(m.id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

fn conflict(new: &NewMovie, existing: &movie::Model) -> AppError {
    if existing.title == new.title {
        AppError::Conflict(format!("\"{}\" is already in your collection", new.title))
    } else {
        AppError::Conflict(format!(
            "movie {} is already in your collection as \"{}\"",
            existing.id, existing.title
        ))
    }
}

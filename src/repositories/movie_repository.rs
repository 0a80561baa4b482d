// src/repositories/movie_repository.rs
//
// Movie persistence
//
// Multi-table writes (movie + genre rows) run inside one transaction;
// dropping an uncommitted rusqlite transaction rolls back, so a failure
// mid-sequence leaves no partial state.

use std::sync::Arc;

use rusqlite::{params, Connection, Row, ToSql};
use uuid::Uuid;

use crate::db::ConnectionPool;
use crate::domain::movie::Movie;
use crate::domain::query::{GetAllMoviesOptions, SortOrder};
use crate::domain::rating::round_rating;
use crate::error::{AppError, AppResult};

#[cfg_attr(test, mockall::automock)]
pub trait MovieRepository: Send + Sync {
    fn create(&self, movie: &Movie) -> AppResult<bool>;
    fn get_by_id(&self, id: Uuid, user_id: Option<Uuid>) -> AppResult<Option<Movie>>;
    fn get_by_slug(&self, slug: &str, user_id: Option<Uuid>) -> AppResult<Option<Movie>>;
    fn get_all(&self, options: &GetAllMoviesOptions) -> AppResult<Vec<Movie>>;
    fn get_count(&self, title: Option<String>, year_of_release: Option<i32>) -> AppResult<usize>;
    fn update(&self, movie: &Movie) -> AppResult<bool>;
    fn delete_by_id(&self, id: Uuid) -> AppResult<bool>;
    fn exists_by_id(&self, id: Uuid) -> AppResult<bool>;
}

pub struct SqliteMovieRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteMovieRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map a joined row (rating aggregate + user rating) to a Movie.
    /// Genres are attached by the caller.
    fn row_to_movie(row: &Row) -> Result<Movie, rusqlite::Error> {
        let id_str: String = row.get("id")?;
        let id = Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?;

        let rating: Option<f64> = row.get("rating")?;

        Ok(Movie {
            id,
            title: row.get("title")?,
            slug: row.get("slug")?,
            year_of_release: row.get("year_of_release")?,
            genres: Vec::new(),
            rating: rating.map(round_rating),
            user_rating: row.get("user_rating")?,
        })
    }

    /// Map a listing row, where genres arrive as one delimited column.
    fn row_to_listed_movie(row: &Row) -> Result<Movie, rusqlite::Error> {
        let mut movie = Self::row_to_movie(row)?;
        let genres: Option<String> = row.get("genres")?;
        movie.genres = genres
            .map(|g| g.split(',').map(str::to_string).collect())
            .unwrap_or_default();
        Ok(movie)
    }

    /// Optional title/year predicates as parameterized fragments.
    /// Both the page fetch and the count query build their WHERE clause
    /// here, so the two can never drift apart.
    fn filter_clause(
        title: Option<&str>,
        year_of_release: Option<i32>,
        params: &mut Vec<Box<dyn ToSql>>,
    ) -> String {
        let mut predicates: Vec<&str> = Vec::new();

        if let Some(title) = title {
            predicates.push("m.title LIKE '%' || ? || '%'");
            params.push(Box::new(title.to_string()));
        }
        if let Some(year) = year_of_release {
            predicates.push("m.year_of_release = ?");
            params.push(Box::new(year));
        }

        if predicates.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", predicates.join(" AND "))
        }
    }

    /// ORDER BY from the whitelisted sort field only. The column name
    /// comes out of the SortField lookup table, never from caller text.
    fn order_clause(options: &GetAllMoviesOptions) -> String {
        match (options.sort_field, options.sort_order) {
            (Some(field), SortOrder::Ascending) => {
                format!(" ORDER BY m.{} ASC", field.column())
            }
            (Some(field), SortOrder::Descending) => {
                format!(" ORDER BY m.{} DESC", field.column())
            }
            _ => String::new(),
        }
    }

    fn fetch_genres(conn: &Connection, id: Uuid) -> AppResult<Vec<String>> {
        let mut stmt = conn.prepare("SELECT genre FROM genres WHERE movie_id = ?1")?;
        let genres = stmt
            .query_map(params![id.to_string()], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(genres)
    }

    fn get_by_key(
        &self,
        key_predicate: &str,
        key: &dyn ToSql,
        user_id: Option<Uuid>,
    ) -> AppResult<Option<Movie>> {
        let conn = self.pool.get()?;

        let sql = format!(
            "SELECT m.id, m.slug, m.title, m.year_of_release,
                    avg(r.value) AS rating,
                    ur.value AS user_rating
             FROM movies m
             LEFT JOIN ratings r ON m.id = r.movie_id
             LEFT JOIN ratings ur ON m.id = ur.movie_id AND ur.user_id = ?2
             WHERE {}
             GROUP BY m.id, ur.value",
            key_predicate
        );

        let mut stmt = conn.prepare(&sql)?;
        let result = stmt.query_row(
            params![key, user_id.map(|u| u.to_string())],
            Self::row_to_movie,
        );

        let mut movie = match result {
            Ok(movie) => movie,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(AppError::from(e)),
        };

        // Child rows are fetched only once the parent row is confirmed.
        movie.genres = Self::fetch_genres(&conn, movie.id)?;
        Ok(Some(movie))
    }
}

impl MovieRepository for SqliteMovieRepository {
    fn create(&self, movie: &Movie) -> AppResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        let result = tx.execute(
            "INSERT INTO movies (id, slug, title, year_of_release) VALUES (?1, ?2, ?3, ?4)",
            params![
                movie.id.to_string(),
                movie.slug,
                movie.title,
                movie.year_of_release,
            ],
        )?;

        if result > 0 {
            for genre in &movie.genres {
                tx.execute(
                    "INSERT INTO genres (movie_id, genre) VALUES (?1, ?2)",
                    params![movie.id.to_string(), genre],
                )?;
            }
        }

        tx.commit()?;
        Ok(result > 0)
    }

    fn get_by_id(&self, id: Uuid, user_id: Option<Uuid>) -> AppResult<Option<Movie>> {
        self.get_by_key("m.id = ?1", &id.to_string(), user_id)
    }

    fn get_by_slug(&self, slug: &str, user_id: Option<Uuid>) -> AppResult<Option<Movie>> {
        self.get_by_key("m.slug = ?1", &slug.to_string(), user_id)
    }

    fn get_all(&self, options: &GetAllMoviesOptions) -> AppResult<Vec<Movie>> {
        let conn = self.pool.get()?;

        let mut bind: Vec<Box<dyn ToSql>> = Vec::new();
        bind.push(Box::new(options.user_id.map(|u| u.to_string())));

        let where_clause =
            Self::filter_clause(options.title.as_deref(), options.year_of_release, &mut bind);
        let order_clause = Self::order_clause(options);

        let sql = format!(
            "SELECT m.id, m.slug, m.title, m.year_of_release,
                    group_concat(DISTINCT g.genre) AS genres,
                    avg(r.value) AS rating,
                    ur.value AS user_rating
             FROM movies m
             LEFT JOIN genres g ON m.id = g.movie_id
             LEFT JOIN ratings r ON m.id = r.movie_id
             LEFT JOIN ratings ur ON m.id = ur.movie_id AND ur.user_id = ?{}
             GROUP BY m.id, ur.value{}
             LIMIT ? OFFSET ?",
            where_clause, order_clause
        );

        bind.push(Box::new(options.page_size as i64));
        bind.push(Box::new(
            (options.page.saturating_sub(1) as i64) * options.page_size as i64,
        ));

        let bind_refs: Vec<&dyn ToSql> = bind.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let movies = stmt
            .query_map(&bind_refs[..], Self::row_to_listed_movie)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(movies)
    }

    fn get_count(&self, title: Option<String>, year_of_release: Option<i32>) -> AppResult<usize> {
        let conn = self.pool.get()?;

        let mut bind: Vec<Box<dyn ToSql>> = Vec::new();
        let where_clause = Self::filter_clause(title.as_deref(), year_of_release, &mut bind);

        let sql = format!("SELECT count(m.id) FROM movies m{}", where_clause);
        let bind_refs: Vec<&dyn ToSql> = bind.iter().map(|p| p.as_ref()).collect();

        let count: i64 = conn.query_row(&sql, &bind_refs[..], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn update(&self, movie: &Movie) -> AppResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        // The genre set is replaced wholesale: delete then re-insert,
        // all inside the same transaction as the scalar update.
        tx.execute(
            "DELETE FROM genres WHERE movie_id = ?1",
            params![movie.id.to_string()],
        )?;
        for genre in &movie.genres {
            tx.execute(
                "INSERT INTO genres (movie_id, genre) VALUES (?1, ?2)",
                params![movie.id.to_string(), genre],
            )?;
        }

        let result = tx.execute(
            "UPDATE movies SET slug = ?1, title = ?2, year_of_release = ?3 WHERE id = ?4",
            params![
                movie.slug,
                movie.title,
                movie.year_of_release,
                movie.id.to_string(),
            ],
        )?;

        tx.commit()?;
        Ok(result > 0)
    }

    fn delete_by_id(&self, id: Uuid) -> AppResult<bool> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;

        // Children first: genre and rating rows cannot outlive the movie.
        tx.execute(
            "DELETE FROM genres WHERE movie_id = ?1",
            params![id.to_string()],
        )?;
        tx.execute(
            "DELETE FROM ratings WHERE movie_id = ?1",
            params![id.to_string()],
        )?;
        let result = tx.execute("DELETE FROM movies WHERE id = ?1", params![id.to_string()])?;

        tx.commit()?;
        Ok(result > 0)
    }

    fn exists_by_id(&self, id: Uuid) -> AppResult<bool> {
        let conn = self.pool.get()?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM movies WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_connection_pool, initialize_database};
    use crate::domain::query::SortField;

    fn test_repo() -> (tempfile::TempDir, SqliteMovieRepository, Arc<ConnectionPool>) {
        let dir = tempfile::tempdir().unwrap();
        let pool = Arc::new(create_connection_pool(&dir.path().join("test.db")).unwrap());
        initialize_database(&pool.get().unwrap()).unwrap();
        let repo = SqliteMovieRepository::new(pool.clone());
        (dir, repo, pool)
    }

    fn sample_movie(title: &str, year: i32, genres: &[&str]) -> Movie {
        Movie::new(
            title.to_string(),
            year,
            genres.iter().map(|g| g.to_string()).collect(),
        )
    }

    fn insert_rating(pool: &ConnectionPool, user_id: Uuid, movie_id: Uuid, value: i32) {
        pool.get()
            .unwrap()
            .execute(
                "INSERT INTO ratings (user_id, movie_id, value) VALUES (?1, ?2, ?3)",
                params![user_id.to_string(), movie_id.to_string(), value],
            )
            .unwrap();
    }

    #[test]
    fn test_create_then_get_by_id() {
        let (_dir, repo, _pool) = test_repo();
        let movie = sample_movie("Heat", 1995, &["Crime", "Thriller"]);

        assert!(repo.create(&movie).unwrap());

        let found = repo.get_by_id(movie.id, None).unwrap().unwrap();
        assert_eq!(found.title, "Heat");
        assert_eq!(found.slug, "heat-1995");
        assert_eq!(found.year_of_release, 1995);

        let mut genres = found.genres.clone();
        genres.sort();
        assert_eq!(genres, vec!["Crime", "Thriller"]);
        assert!(found.rating.is_none());
        assert!(found.user_rating.is_none());
    }

    #[test]
    fn test_get_by_slug() {
        let (_dir, repo, _pool) = test_repo();
        let movie = sample_movie("Blade Runner", 1982, &["Sci-Fi"]);
        repo.create(&movie).unwrap();

        let found = repo.get_by_slug("blade-runner-1982", None).unwrap().unwrap();
        assert_eq!(found.id, movie.id);

        assert!(repo.get_by_slug("no-such-movie-1900", None).unwrap().is_none());
    }

    #[test]
    fn test_get_missing_returns_none() {
        let (_dir, repo, _pool) = test_repo();
        assert!(repo.get_by_id(Uuid::new_v4(), None).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_slug_fails_and_rolls_back() {
        let (_dir, repo, pool) = test_repo();
        let first = sample_movie("Heat", 1995, &["Crime"]);
        repo.create(&first).unwrap();

        // Same title + year -> same slug -> unique index violation
        let duplicate = sample_movie("Heat", 1995, &["Thriller", "Drama"]);
        let err = repo.create(&duplicate).unwrap_err();
        assert!(matches!(err, AppError::Constraint(_)));

        // The first movie is untouched and no rows survive for the
        // failed id.
        let found = repo.get_by_id(first.id, None).unwrap().unwrap();
        assert_eq!(found.genres, vec!["Crime"]);

        let orphan_genres: i64 = pool
            .get()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM genres WHERE movie_id = ?1",
                params![duplicate.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(orphan_genres, 0);
        assert!(repo.get_by_id(duplicate.id, None).unwrap().is_none());
    }

    #[test]
    fn test_update_replaces_genre_set() {
        let (_dir, repo, _pool) = test_repo();
        let movie = sample_movie("Alien", 1979, &["Horror", "Sci-Fi"]);
        repo.create(&movie).unwrap();

        let updated = Movie::with_id(movie.id, "Alien".to_string(), 1979, vec!["Thriller".to_string()]);
        assert!(repo.update(&updated).unwrap());

        let found = repo.get_by_id(movie.id, None).unwrap().unwrap();
        assert_eq!(found.genres, vec!["Thriller"]);
    }

    #[test]
    fn test_delete_removes_children_and_reports_existence() {
        let (_dir, repo, pool) = test_repo();
        let movie = sample_movie("Seven", 1995, &["Crime", "Thriller"]);
        repo.create(&movie).unwrap();
        insert_rating(&pool, Uuid::new_v4(), movie.id, 5);

        assert!(repo.delete_by_id(movie.id).unwrap());
        assert!(repo.get_by_id(movie.id, None).unwrap().is_none());

        let leftovers: i64 = pool
            .get()
            .unwrap()
            .query_row(
                "SELECT (SELECT COUNT(*) FROM genres WHERE movie_id = ?1)
                      + (SELECT COUNT(*) FROM ratings WHERE movie_id = ?1)",
                params![movie.id.to_string()],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(leftovers, 0);

        // Second delete finds nothing
        assert!(!repo.delete_by_id(movie.id).unwrap());
    }

    #[test]
    fn test_exists_by_id() {
        let (_dir, repo, _pool) = test_repo();
        let movie = sample_movie("Ran", 1985, &["Drama"]);
        repo.create(&movie).unwrap();

        assert!(repo.exists_by_id(movie.id).unwrap());
        assert!(!repo.exists_by_id(Uuid::new_v4()).unwrap());
    }

    #[test]
    fn test_get_all_joins_ratings_and_genres() {
        let (_dir, repo, pool) = test_repo();
        let movie = sample_movie("Heat", 1995, &["Crime", "Thriller"]);
        repo.create(&movie).unwrap();

        let (u1, u2) = (Uuid::new_v4(), Uuid::new_v4());
        insert_rating(&pool, u1, movie.id, 4);
        insert_rating(&pool, u2, movie.id, 2);

        let options = GetAllMoviesOptions::new().with_user(Some(u1));

        let movies = repo.get_all(&options).unwrap();
        assert_eq!(movies.len(), 1);

        let found = &movies[0];
        assert_eq!(found.rating, Some(3.0));
        assert_eq!(found.user_rating, Some(4));

        let mut genres = found.genres.clone();
        genres.sort();
        assert_eq!(genres, vec!["Crime", "Thriller"]);
    }

    #[test]
    fn test_get_all_filters_by_title_and_year() {
        let (_dir, repo, _pool) = test_repo();
        repo.create(&sample_movie("Heat", 1995, &["Crime"])).unwrap();
        repo.create(&sample_movie("Heathers", 1988, &["Comedy"])).unwrap();
        repo.create(&sample_movie("Casino", 1995, &["Crime"])).unwrap();

        let mut options = GetAllMoviesOptions::new();
        options.title = Some("Heat".to_string());
        let titles: Vec<String> = repo
            .get_all(&options)
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"Heat".to_string()));
        assert!(titles.contains(&"Heathers".to_string()));

        let mut options = GetAllMoviesOptions::new();
        options.year_of_release = Some(1995);
        assert_eq!(repo.get_all(&options).unwrap().len(), 2);

        let mut options = GetAllMoviesOptions::new();
        options.title = Some("Heat".to_string());
        options.year_of_release = Some(1995);
        let both = repo.get_all(&options).unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].title, "Heat");
    }

    #[test]
    fn test_get_count_matches_filtered_pages() {
        let (_dir, repo, _pool) = test_repo();
        for (title, year) in [
            ("Heat", 1995),
            ("Casino", 1995),
            ("Seven", 1995),
            ("Twister", 1996),
            ("Fargo", 1996),
        ] {
            repo.create(&sample_movie(title, year, &["Drama"])).unwrap();
        }

        let count = repo.get_count(None, Some(1995)).unwrap();
        assert_eq!(count, 3);

        // Sum of page lengths equals the count for the same filter
        let mut fetched = 0;
        for page in 1..=4 {
            let mut options = GetAllMoviesOptions::new();
            options.year_of_release = Some(1995);
            options.page = page;
            options.page_size = 2;
            fetched += repo.get_all(&options).unwrap().len();
        }
        assert_eq!(fetched, count);
    }

    #[test]
    fn test_pagination_boundaries() {
        let (_dir, repo, _pool) = test_repo();
        for i in 0..5 {
            repo.create(&sample_movie(&format!("Movie {}", i), 2000 + i, &["Drama"]))
                .unwrap();
        }

        let mut options = GetAllMoviesOptions::new();
        options.page_size = 2;

        options.page = 1;
        assert_eq!(repo.get_all(&options).unwrap().len(), 2);
        options.page = 3;
        assert_eq!(repo.get_all(&options).unwrap().len(), 1);
        options.page = 4;
        assert_eq!(repo.get_all(&options).unwrap().len(), 0);
    }

    #[test]
    fn test_get_all_sorts_by_whitelisted_field() {
        let (_dir, repo, _pool) = test_repo();
        repo.create(&sample_movie("Zodiac", 2007, &["Crime"])).unwrap();
        repo.create(&sample_movie("Alien", 1979, &["Horror"])).unwrap();
        repo.create(&sample_movie("Memento", 2000, &["Thriller"])).unwrap();

        let mut options = GetAllMoviesOptions::new();
        options.sort_field = Some(SortField::YearOfRelease);
        options.sort_order = SortOrder::Ascending;
        let years: Vec<i32> = repo
            .get_all(&options)
            .unwrap()
            .into_iter()
            .map(|m| m.year_of_release)
            .collect();
        assert_eq!(years, vec![1979, 2000, 2007]);

        options.sort_field = Some(SortField::Title);
        options.sort_order = SortOrder::Descending;
        let titles: Vec<String> = repo
            .get_all(&options)
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["Zodiac", "Memento", "Alien"]);
    }
}

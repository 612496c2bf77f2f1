use crate::models::Movie;

/// Assigns ranks over a collection sorted ascending by rating: the last
/// (highest rated) movie gets rank 1, the first gets rank `len`.
///
/// Ranks past `i32::MAX` saturate; the column is a 32-bit integer.
pub fn assign(movies: &mut [Movie]) {
    let count = movies.len();
    for (index, movie) in movies.iter_mut().enumerate() {
        movie.ranking = i32::try_from(count - index).unwrap_or(i32::MAX);
    }
}

/// Ranks an ascending collection and returns it best-first for display.
pub fn rerank_for_display(mut movies: Vec<Movie>) -> Vec<Movie> {
    assign(&mut movies);
    movies.reverse();
    movies
}

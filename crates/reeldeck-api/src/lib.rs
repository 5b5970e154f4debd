pub mod anilist;
pub mod tmdb;
pub mod trakt;

#[cfg(test)]
pub(crate) mod test_util;

pub mod config;
pub mod corpus;
pub mod graph;
pub mod logger;
pub mod pipeline;
pub mod utilities;

#[cfg(test)]
mod test_utilities;

#[cfg(test)]
mod tests;

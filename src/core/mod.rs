pub mod classifier;
pub mod corpus;
pub mod filter;
pub mod generator;
pub mod markov;

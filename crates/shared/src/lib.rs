pub mod domain;
pub mod keyspace;
pub mod protocol;

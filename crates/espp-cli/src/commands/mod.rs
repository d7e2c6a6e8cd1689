pub mod espp;

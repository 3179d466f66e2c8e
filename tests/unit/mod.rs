//! Unit tests, one file per source module under the matching path

mod augment;

pub mod altman;
pub mod profile;
pub mod ratios;
pub mod scoring;
pub mod statement;

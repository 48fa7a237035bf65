pub mod briefs;

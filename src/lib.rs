pub mod vidsort_core;

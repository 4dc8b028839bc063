pub mod bundle_suggestion;

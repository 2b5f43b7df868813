mod enumerate_tests;
mod range_tests;

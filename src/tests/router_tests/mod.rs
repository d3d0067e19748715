mod announcement_tests;
mod auth_tests;
mod booking_tests;
mod payment_tests;
mod utility_tests;

pub mod health;
pub mod home;
pub mod predict;

// Route table (all mounted at the root, no version prefix, to keep the
// paths existing clients and bookmarks use):
//
// /          GET   form page
// /predict   POST  score one set of sensor readings
// /health    GET   liveness plus artifact readiness

pub mod login;          // Sign-in screen
pub mod pipeline;       // Lead pipeline board (staff, admin)
pub mod dashboard;      // Stats cards and MIS export (staff, admin)
pub mod attendance;     // Check-in / check-out (staff, student)
pub mod backup;         // Backup & restore (admin)

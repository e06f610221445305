mod mock;

pub use mock::MockBillingFeed;

/// A known demonstration account. Signing in with one of these on a fresh
/// backend provisions it on the fly; arbitrary emails are never provisioned.
#[derive(Debug, Clone, Copy)]
pub struct DemoAccount {
    pub email: &'static str,
    pub password: &'static str,
    pub display_name: &'static str,
}

pub const DEMO_ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        email: "admin@u4.com",
        password: "admin123",
        display_name: "Demo Administrator",
    },
    DemoAccount {
        email: "team@u4.com",
        password: "team123",
        display_name: "Demo Team Member",
    },
    DemoAccount {
        email: "user@gmail.com",
        password: "user123",
        display_name: "Demo User",
    },
];

/// Exact match on both email and password: a wrong password for a real
/// account must fail normally.
pub fn find(email: &str, password: &str) -> Option<&'static DemoAccount> {
    DEMO_ACCOUNTS
        .iter()
        .find(|account| account.email == email && account.password == password)
}

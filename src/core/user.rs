use uuid::Uuid;

pub const EMAIL_DOMAIN: &str = "lumiera.ai";

/// Local, name-only identity. Nothing here is a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl User {
    /// Builds a user from a typed name; `None` when the name is blank.
    pub fn login(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: derive_email(name),
            avatar: None,
        })
    }

    /// Renames the user. Blank or unchanged names are rejected; the email
    /// stays whatever it was at login.
    pub fn rename(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || name == self.name {
            return false;
        }
        self.name = name.to_string();
        true
    }

    pub fn first_name(&self) -> &str {
        self.name.split(' ').next().unwrap_or(&self.name)
    }
}

fn derive_email(name: &str) -> String {
    let local: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '.' } else { c })
        .collect();
    format!("{local}@{EMAIL_DOMAIN}")
}

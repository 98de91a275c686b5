use super::{ComponentId, ContainerId};

/// An entry of a container: a component or a nested container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Member {
    Component(ComponentId),
    Container(ContainerId),
}

impl From<ComponentId> for Member {
    fn from(id: ComponentId) -> Self {
        Member::Component(id)
    }
}

impl From<ContainerId> for Member {
    fn from(id: ContainerId) -> Self {
        Member::Container(id)
    }
}

/// Ordered set of members. Bulk operations on the surface walk it depth
/// first in insertion order.
#[derive(Debug, Clone)]
pub struct Container {
    name: String,
    group: Option<String>,
    members: Vec<Member>,
}

impl Container {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group: None,
            members: Vec::new(),
        }
    }

    /// Group given to members that were built without one.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Append unless already present. Returns whether the member was added.
    pub(crate) fn push(&mut self, member: Member) -> bool {
        if self.members.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }
}

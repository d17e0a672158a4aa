//! Roster - the ordered set of actors an owner collects from
//!
//! A roster is owned and mutated by a single actor. It only grows, and the
//! collector only ever sees it through [`Roster::snapshot`] or
//! [`Roster::iter`], so a collection is always taken over the membership as
//! it was when the query started.

/// Append-only, ordered list of handles
#[derive(Debug, Clone)]
pub struct Roster<H> {
  members: Vec<H>,
}

impl<H> Default for Roster<H> {
  fn default() -> Self {
    Self { members: Vec::new() }
  }
}

impl<H> Roster<H> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a member at the end
  pub fn push(&mut self, member: H) {
    self.members.push(member);
  }

  pub fn len(&self) -> usize {
    self.members.len()
  }

  pub fn is_empty(&self) -> bool {
    self.members.is_empty()
  }

  /// Members in insertion order
  pub fn iter(&self) -> std::slice::Iter<'_, H> {
    self.members.iter()
  }
}

impl<H: Clone> Roster<H> {
  /// Copy of the current membership, in insertion order
  pub fn snapshot(&self) -> Vec<H> {
    self.members.clone()
  }
}

impl<H> FromIterator<H> for Roster<H> {
  fn from_iter<I: IntoIterator<Item = H>>(iter: I) -> Self {
    Self {
      members: iter.into_iter().collect(),
    }
  }
}

impl<'a, H> IntoIterator for &'a Roster<H> {
  type Item = &'a H;
  type IntoIter = std::slice::Iter<'a, H>;

  fn into_iter(self) -> Self::IntoIter {
    self.iter()
  }
}

#![allow(dead_code)]

use unit_fixture::fake::Dummy;
use unit_fixture::fake::faker::internet::en::SafeEmail;
use unit_fixture::fake::faker::name::en::Name;

/// Plain three-field record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Dummy)]
pub struct Person {
    #[dummy(faker = "Name()")]
    pub name: String,
    #[dummy(faker = "18..90")]
    pub age: u32,
    #[dummy(faker = "SafeEmail()")]
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Dummy)]
pub struct Team {
    pub title: String,
    pub lead: Person,
    pub members: Vec<Person>,
}

//! Behavioural tests for the donation review pipeline.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tokio::runtime::Runtime;

use alumni_backend::domain::capabilities::CapabilityResolver;
use alumni_backend::domain::{
    Amount, DonationDraft, DonationId, DonationService, MemberId,
};
use alumni_backend::test_support::{
    InMemoryBlobStore, InMemoryDonationRepository, InMemoryMemberRepository,
    InMemoryRoleRepository,
};

mod support;

const DONATED_PAISE: i64 = 250_000;

struct DonationWorld {
    runtime: Runtime,
    members: Arc<InMemoryMemberRepository>,
    service: DonationService,
    donor: Option<MemberId>,
    admin: MemberId,
    donation: Option<DonationId>,
}

#[fixture]
fn world() -> DonationWorld {
    let members = Arc::new(InMemoryMemberRepository::default());
    let roles = Arc::new(InMemoryRoleRepository::default());
    let donations = Arc::new(InMemoryDonationRepository::default());
    let service = DonationService::new(
        donations,
        members.clone(),
        Arc::new(InMemoryBlobStore::default()),
        CapabilityResolver::new(roles.clone()),
        Arc::new(DefaultClock),
    );
    let admin = MemberId::random();
    roles.grant_admin(&admin);
    DonationWorld {
        runtime: support::runtime(),
        members,
        service,
        donor: None,
        admin,
        donation: None,
    }
}

fn draft(anonymous: bool) -> DonationDraft {
    DonationDraft {
        amount: Amount::from_paise(DONATED_PAISE).expect("valid amount"),
        anonymous,
        message: Some("For the library".to_owned()),
        transaction_reference: None,
        payment_method: Some("upi".to_owned()),
        proof: None,
    }
}

fn submit(world: &mut DonationWorld, anonymous: bool) {
    let donor = world.donor.clone().expect("donor should exist");
    let donation = world
        .runtime
        .block_on(world.service.submit(&donor, draft(anonymous)))
        .expect("submission should succeed");
    world.donation = Some(donation.id);
}

#[given("a member with a profile")]
fn a_member_with_a_profile(world: &mut DonationWorld) {
    let member = support::profile("Asha Rao", "2008", support::any_birthday());
    world.donor = Some(member.id.clone());
    world.members.seed(member);
}

#[when("the member donates 250000 paise")]
fn the_member_donates(world: &mut DonationWorld) {
    submit(world, false);
}

#[when("the member donates 250000 paise anonymously")]
fn the_member_donates_anonymously(world: &mut DonationWorld) {
    submit(world, true);
}

#[when("an administrator verifies the donation")]
fn an_administrator_verifies_the_donation(world: &mut DonationWorld) {
    let id = world.donation.expect("donation should exist");
    let admin = world.admin.clone();
    world
        .runtime
        .block_on(world.service.verify(&admin, id))
        .expect("verification should succeed");
}

#[when("an administrator rejects the donation")]
fn an_administrator_rejects_the_donation(world: &mut DonationWorld) {
    let id = world.donation.expect("donation should exist");
    let admin = world.admin.clone();
    world
        .runtime
        .block_on(world.service.reject(&admin, id))
        .expect("rejection should succeed");
}

#[then("the donation awaits review")]
fn the_donation_awaits_review(world: &mut DonationWorld) {
    let admin = world.admin.clone();
    let pending = world
        .runtime
        .block_on(world.service.list_pending(&admin))
        .expect("pending listing should succeed");
    assert_eq!(pending.len(), 1);
    assert!(!pending[0].verified);
}

#[then("the donor wall is empty")]
fn the_donor_wall_is_empty(world: &mut DonationWorld) {
    let wall = world
        .runtime
        .block_on(world.service.donor_wall())
        .expect("wall should load");
    assert!(wall.is_empty());
}

#[then("the donor wall shows the donor's name")]
fn the_donor_wall_shows_the_donors_name(world: &mut DonationWorld) {
    let wall = world
        .runtime
        .block_on(world.service.donor_wall())
        .expect("wall should load");
    assert_eq!(wall.len(), 1);
    assert_eq!(wall[0].donor_name, "Asha Rao");
}

#[then("the donor wall shows the anonymous mask")]
fn the_donor_wall_shows_the_anonymous_mask(world: &mut DonationWorld) {
    let wall = world
        .runtime
        .block_on(world.service.donor_wall())
        .expect("wall should load");
    assert_eq!(wall.len(), 1);
    assert_eq!(wall[0].donor_name, "Anonymous");
}

#[then("the public total equals the donated amount")]
fn the_public_total_equals_the_donated_amount(world: &mut DonationWorld) {
    let total = world
        .runtime
        .block_on(world.service.public_total())
        .expect("total should load");
    assert_eq!(total.paise(), DONATED_PAISE);
}

#[then("no donations remain anywhere")]
fn no_donations_remain_anywhere(world: &mut DonationWorld) {
    let admin = world.admin.clone();
    let pending = world
        .runtime
        .block_on(world.service.list_pending(&admin))
        .expect("pending listing should succeed");
    assert!(pending.is_empty());
    let wall = world
        .runtime
        .block_on(world.service.donor_wall())
        .expect("wall should load");
    assert!(wall.is_empty());
}

#[scenario(
    path = "tests/features/donation_review.feature",
    name = "A verified donation reaches the donor wall and the total"
)]
fn a_verified_donation_reaches_the_wall(world: DonationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/donation_review.feature",
    name = "An anonymous donation is masked on the wall"
)]
fn an_anonymous_donation_is_masked(world: DonationWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/donation_review.feature",
    name = "A rejected donation disappears entirely"
)]
fn a_rejected_donation_disappears(world: DonationWorld) {
    drop(world);
}

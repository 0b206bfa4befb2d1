#![allow(dead_code)]

use std::{collections::VecDeque, sync::Mutex};

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{Database, DatabaseConnection};

use engine::{
    Engine, EngineBuilder, NewOrder, NewTruck, NewUser, OrderCodeSource, Principal, Role, Stop,
};
use migration::MigratorTrait;

/// One admin, two owners and two drivers on a fresh in-memory database.
pub struct Fleet {
    pub engine: Engine,
    pub db: DatabaseConnection,
    pub admin: Principal,
    pub owner: Principal,
    pub other_owner: Principal,
    pub driver: Principal,
    pub other_driver: Principal,
}

pub async fn fleet() -> Fleet {
    fleet_with(Engine::builder()).await
}

pub async fn fleet_with(builder: EngineBuilder) -> Fleet {
    fleet_on("sqlite::memory:", builder).await
}

pub async fn fleet_on(url: &str, builder: EngineBuilder) -> Fleet {
    let db = Database::connect(url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = builder.database(db.clone()).build().await.unwrap();

    let admin = provision(&engine, "admin@haulage.test", Role::Admin, "Asha", "Rao").await;
    let owner = provision(&engine, "owner@haulage.test", Role::Owner, "Om", "Prakash").await;
    let other_owner =
        provision(&engine, "owner2@haulage.test", Role::Owner, "Neha", "Kulkarni").await;
    let driver = provision(&engine, "driver@haulage.test", Role::Driver, "Ravi", "Kumar").await;
    let other_driver =
        provision(&engine, "driver2@haulage.test", Role::Driver, "Sunil", "Das").await;

    Fleet {
        engine,
        db,
        admin,
        owner,
        other_owner,
        driver,
        other_driver,
    }
}

async fn provision(engine: &Engine, email: &str, role: Role, first: &str, last: &str) -> Principal {
    let user = engine
        .provision_user(NewUser::new(email, role, "$2b$04$hash").name(first, last))
        .await
        .unwrap();
    user.principal()
}

pub fn in_a_year() -> NaiveDate {
    Utc::now().date_naive() + Duration::days(365)
}

pub fn truck_for(number: &str, owner: &Principal) -> NewTruck {
    NewTruck::new(number, owner.user_id, in_a_year(), in_a_year(), in_a_year())
        .vehicle("Tata", "Signa 4825", 2023)
        .axle_count(3)
        .capacity_kg(25_000)
}

/// ₹50,000.00 total with ₹10,000.00 advance, picked up tomorrow.
pub fn order_for(owner: &Principal) -> NewOrder {
    let pickup = Utc::now() + Duration::days(1);
    NewOrder::new(
        owner.user_id,
        Stop::new("Pune MIDC", "Kiran", "+91 98200 00001"),
        Stop::new("Nagpur Depot", "Farah", "+91 98200 00002"),
        pickup,
        pickup + Duration::days(2),
    )
    .load("Steel coils", 12_000)
    .amounts(50_000_00, 10_000_00)
}

/// Hands out queued codes, repeating the last one once the queue is drained.
#[derive(Debug)]
pub struct ScriptedCodes(Mutex<VecDeque<String>>);

impl ScriptedCodes {
    pub fn new(codes: &[&str]) -> Self {
        Self(Mutex::new(codes.iter().map(|c| c.to_string()).collect()))
    }
}

impl OrderCodeSource for ScriptedCodes {
    fn next_code(&self) -> String {
        let mut queue = self.0.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    }
}

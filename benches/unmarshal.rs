use brrtbind::source::Request;
use brrtbind::{Binder, Params, Record};
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};
use std::hint::black_box;

#[derive(Debug, Default, Record)]
pub struct Address {
    pub street: String,
    pub city: String,
    #[request("zip,required")]
    pub zip: String,
}

#[derive(Debug, Default, Record)]
pub struct Customer {
    #[request(",required")]
    pub id: u64,
    #[request("name,required")]
    pub name: String,
    pub email: Option<String>,
    #[request("tier,default=basic")]
    pub tier: String,
    pub score: f64,
    pub active: bool,
    pub tags: Vec<String>,
    #[embed]
    pub address: Address,
}

fn customer_params() -> Params {
    match json!({
        "id": "1042",
        "name": "Ada",
        "email": "ada@example.com",
        "score": "97.5",
        "active": true,
        "tags": ["vip", "beta"],
        "street": "1 Loop Rd",
        "city": "Cupertino",
        "zip": "95014",
    }) {
        Value::Object(map) => map.into_iter().collect(),
        _ => Params::new(),
    }
}

fn bench_unmarshal(c: &mut Criterion) {
    let binder = Binder::new();
    let params = customer_params();

    c.bench_function("unmarshal_params", |b| {
        b.iter(|| {
            let mut customer = Customer::default();
            let res = binder.unmarshal(black_box(&params), &mut customer);
            black_box((res, customer));
        })
    });

    c.bench_function("unmarshal_replace_params", |b| {
        let mut customer = Customer::default();
        b.iter(|| {
            let res = binder.unmarshal_replace(black_box(&params), &mut customer);
            black_box(&res);
        })
    });

    let request = Request::new().with_query("id=7&zip=10001").with_body(
        "application/x-www-form-urlencoded",
        "name=Grace&score=12.25&tags=x&city=New%20York",
    );
    c.bench_function("unmarshal_form_request", |b| {
        b.iter(|| {
            let mut customer = Customer::default();
            let res = binder.unmarshal(black_box(&request), &mut customer);
            black_box((res, customer));
        })
    });
}

criterion_group!(benches, bench_unmarshal);
criterion_main!(benches);

//! Test Data Builders
//!
//! Builders for service requests with sensible defaults. Every builder
//! draws fresh identity values (plate, renavam, CNH, phone, email), so
//! several builders can be used against one store without unique-key
//! clashes. Descriptive fields come from `fake`.

use std::sync::atomic::{AtomicU32, Ordering};

use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;

use core_kernel::ManagerId;
use domain_fleet::services::{AddressInput, CreateCarRequest, CreateDriverRequest};

use crate::generators::complete_cnh;

static SEQUENCE: AtomicU32 = AtomicU32::new(1);

fn next_sequence() -> u32 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

const COLORS: [&str; 4] = ["Branco", "Prata", "Preto", "Vermelho"];

const BRANDS: [(&str, &str); 5] = [
    ("Fiat", "Argo"),
    ("Volkswagen", "Polo"),
    ("Chevrolet", "Onix"),
    ("Toyota", "Corolla"),
    ("Hyundai", "HB20"),
];

/// A unique legacy-layout plate
pub fn unique_plate() -> String {
    let n = next_sequence();
    let letters: String = [n / 676 % 26, n / 26 % 26, n % 26]
        .iter()
        .map(|i| char::from(b'A' + *i as u8))
        .collect();
    format!("{}{:04}", letters, n % 10_000)
}

/// A unique 11-digit renavam
pub fn unique_renavam() -> String {
    format!("{:011}", 10_000_000_000u64 + u64::from(next_sequence()))
}

/// A unique valid CNH
pub fn unique_cnh() -> String {
    loop {
        let n = 100_000_000 + next_sequence();
        let mut payload = [0u8; 9];
        for (i, digit) in n.to_string().bytes().take(9).enumerate() {
            payload[i] = digit - b'0';
        }
        if let Some(cnh) = complete_cnh(&payload) {
            return cnh;
        }
    }
}

/// A unique mobile phone number
pub fn unique_phone() -> String {
    format!("11{:09}", 900_000_000 + next_sequence())
}

/// A unique e-mail address
pub fn unique_email() -> String {
    format!("driver{}@frota.com.br", next_sequence())
}

/// Builder for car registration requests
pub struct CarRequestBuilder {
    request: CreateCarRequest,
}

impl Default for CarRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CarRequestBuilder {
    pub fn new() -> Self {
        let (brand, model) = BRANDS[(0..BRANDS.len()).fake::<usize>()];
        Self {
            request: CreateCarRequest {
                manager_id: ManagerId::new(),
                license_plate: unique_plate(),
                renavam: unique_renavam(),
                brand: brand.to_string(),
                model: model.to_string(),
                year: (2015u16..2025).fake(),
                color: COLORS[(0..COLORS.len()).fake::<usize>()].to_string(),
                odometer: 1000,
            },
        }
    }

    pub fn with_manager(mut self, manager_id: ManagerId) -> Self {
        self.request.manager_id = manager_id;
        self
    }

    pub fn with_plate(mut self, plate: impl Into<String>) -> Self {
        self.request.license_plate = plate.into();
        self
    }

    pub fn with_renavam(mut self, renavam: impl Into<String>) -> Self {
        self.request.renavam = renavam.into();
        self
    }

    pub fn with_odometer(mut self, odometer: u64) -> Self {
        self.request.odometer = odometer;
        self
    }

    pub fn build(self) -> CreateCarRequest {
        self.request
    }
}

/// Builder for driver registration requests
pub struct DriverRequestBuilder {
    request: CreateDriverRequest,
}

impl Default for DriverRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DriverRequestBuilder {
    pub fn new() -> Self {
        Self {
            request: CreateDriverRequest {
                first_name: fake_name_part(FirstName().fake()),
                last_name: fake_name_part(LastName().fake()),
                cnh: unique_cnh(),
                cnh_type: "B".to_string(),
                email: unique_email(),
                phone: unique_phone(),
                address: default_address(),
            },
        }
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.request.first_name = first.into();
        self.request.last_name = last.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.request.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.request.phone = phone.into();
        self
    }

    pub fn with_cnh(mut self, cnh: impl Into<String>) -> Self {
        self.request.cnh = cnh.into();
        self
    }

    pub fn with_cnh_type(mut self, cnh_type: impl Into<String>) -> Self {
        self.request.cnh_type = cnh_type.into();
        self
    }

    pub fn build(self) -> CreateDriverRequest {
        self.request
    }
}

/// A complete, valid address
pub fn default_address() -> AddressInput {
    AddressInput {
        street: "Avenida Paulista".to_string(),
        number: (1u32..3000).fake(),
        district: "Bela Vista".to_string(),
        zip_code: "01310-200".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
    }
}

// Names shorter than two characters would be rejected.
fn fake_name_part(value: String) -> String {
    if value.trim().chars().count() < 2 {
        "Silva".to_string()
    } else {
        value
    }
}

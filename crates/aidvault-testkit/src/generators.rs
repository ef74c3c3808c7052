//! Proptest generators for property-based testing.

use proptest::prelude::*;

use aidvault_core::{
    AccessLevel, BankAccountCredentials, Credential, CredentialKind, DebitCardCredentials,
    EnvelopeKey, IdentityCredentials,
};

/// Generate a subject identifier.
pub fn subject_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}"
}

/// Generate a plausible card number (digits only).
pub fn card_number() -> impl Strategy<Value = String> {
    "[0-9]{12,19}"
}

/// Generate a credential kind.
pub fn credential_kind() -> impl Strategy<Value = CredentialKind> {
    prop_oneof![
        Just(CredentialKind::DebitCard),
        Just(CredentialKind::Identity),
        Just(CredentialKind::BankAccount),
    ]
}

/// Generate an access level.
pub fn access_level() -> impl Strategy<Value = AccessLevel> {
    prop_oneof![
        Just(AccessLevel::User),
        Just(AccessLevel::Admin),
        Just(AccessLevel::Organization),
    ]
}

/// Generate a valid debit-card credential.
pub fn debit_card() -> impl Strategy<Value = Credential> {
    (
        card_number(),
        "(0[1-9]|1[0-2])/[0-9]{2}",
        "[0-9]{3,4}",
        "[A-Za-z][A-Za-z ]{0,23}",
        any::<u64>(),
        any::<bool>(),
        subject_id(),
    )
        .prop_map(
            |(card_number, expiry_date, cvv, bank_name, weekly_limit, is_active, user_id)| {
                Credential::DebitCard(DebitCardCredentials {
                    card_number,
                    expiry_date,
                    cvv,
                    bank_name,
                    weekly_limit,
                    is_active,
                    user_id,
                })
            },
        )
}

/// Generate a valid identity credential.
pub fn identity() -> impl Strategy<Value = Credential> {
    (
        "(passport|national_id|drivers_license)",
        "[A-Z0-9]{6,12}",
        "[A-Za-z][A-Za-z ]{0,31}",
        "19[0-9]{2}-(0[1-9]|1[0-2])-(0[1-9]|2[0-8])",
        "[A-Z]{2}",
        "20[3-4][0-9]-(0[1-9]|1[0-2])-(0[1-9]|2[0-8])",
        "[A-Za-z][A-Za-z ]{0,23}",
        subject_id(),
    )
        .prop_map(
            |(
                document_type,
                document_number,
                full_name,
                date_of_birth,
                nationality,
                expiry_date,
                issuing_authority,
                user_id,
            )| {
                Credential::Identity(IdentityCredentials {
                    document_type,
                    document_number,
                    full_name,
                    date_of_birth,
                    nationality,
                    expiry_date,
                    issuing_authority,
                    user_id,
                })
            },
        )
}

/// Generate a valid bank-account credential.
pub fn bank_account() -> impl Strategy<Value = Credential> {
    (
        "[0-9]{8,12}",
        "[0-9]{9}",
        "[A-Za-z][A-Za-z ]{0,23}",
        "(checking|savings)",
        "[A-Za-z][A-Za-z ]{0,31}",
        subject_id(),
    )
        .prop_map(
            |(
                account_number,
                routing_number,
                bank_name,
                account_type,
                account_holder_name,
                user_id,
            )| {
                Credential::BankAccount(BankAccountCredentials {
                    account_number,
                    routing_number,
                    bank_name,
                    account_type,
                    account_holder_name,
                    user_id,
                })
            },
        )
}

/// Generate a valid credential of any kind.
pub fn credential() -> impl Strategy<Value = Credential> {
    prop_oneof![debit_card(), identity(), bank_account()]
}

/// Generate an envelope key from arbitrary material.
pub fn envelope_key() -> impl Strategy<Value = EnvelopeKey> {
    any::<[u8; 32]>().prop_map(|bytes| {
        EnvelopeKey::from_material(&bytes).expect("32 bytes is always enough key material")
    })
}

/// diesel table for categories
table! {
    categories (id) {
        id -> Integer,
        name -> VarChar,
        slug -> VarChar,
        description -> Nullable<VarChar>,
        image -> Nullable<VarChar>,
        icon -> Nullable<VarChar>,
        parent_id -> Nullable<Integer>,
        level -> Integer,
        ordering -> Integer,
        product_count -> Integer,
        created_at -> Timestamp, // UTC 0, generated at db level
        updated_at -> Timestamp, // UTC 0, generated at db level
    }
}

/// diesel table for companies
table! {
    companies (id) {
        id -> Integer,
        name -> VarChar,
        description -> VarChar,
        email -> VarChar,
        phone -> Nullable<VarChar>,
        website -> Nullable<VarChar>,
        city -> VarChar,
        province -> VarChar,
        country -> VarChar,
        logo -> Nullable<VarChar>,
        cover_image -> Nullable<VarChar>,
        verified -> Bool,
        gold_supplier -> Bool,
        membership_tier -> Nullable<VarChar>,
        trust_score -> Nullable<Integer>,
        product_count -> Integer,
        year_established -> Nullable<Integer>,
        employee_count -> Nullable<VarChar>,
        certifications -> Nullable<Jsonb>,
        main_products -> Nullable<Jsonb>,
        created_at -> Timestamp, // UTC 0, generated at db level
        updated_at -> Timestamp, // UTC 0, generated at db level
    }
}

/// diesel table for company_categories
table! {
    company_categories (id) {
        id -> Integer,
        company_id -> Integer,
        category_id -> Integer,
    }
}

/// diesel table for products
table! {
    products (id) {
        id -> Integer,
        company_id -> Integer,
        category_id -> Integer,
        name -> VarChar,
        description -> VarChar,
        short_description -> Nullable<VarChar>,
        price_amount -> Double,
        price_currency -> VarChar,
        min_order_quantity -> Nullable<Integer>,
        images -> Nullable<Jsonb>,
        specifications -> Nullable<Jsonb>,
        tags -> Nullable<Jsonb>,
        status -> VarChar,
        created_at -> Timestamp, // UTC 0, generated at db level
        updated_at -> Timestamp, // UTC 0, generated at db level
    }
}

/// diesel table for users
table! {
    users (id) {
        id -> Integer,
        email -> VarChar,
        name -> VarChar,
        role -> VarChar,
        company_id -> Nullable<Integer>,
        created_at -> Timestamp, // UTC 0, generated at db level
        updated_at -> Timestamp, // UTC 0, generated at db level
    }
}

/// diesel table for rfqs
table! {
    rfqs (id) {
        id -> Integer,
        title -> VarChar,
        description -> VarChar,
        buyer_id -> Integer,
        category_id -> Integer,
        quantity_min -> Nullable<Integer>,
        quantity_max -> Nullable<Integer>,
        quantity_unit -> Nullable<VarChar>,
        budget_min -> Nullable<Double>,
        budget_max -> Nullable<Double>,
        budget_currency -> Nullable<VarChar>,
        specifications -> Nullable<Jsonb>,
        status -> VarChar,
        deadline -> Nullable<Timestamp>,
        created_at -> Timestamp, // UTC 0, generated at db level
        updated_at -> Timestamp, // UTC 0, generated at db level
    }
}

/// diesel table for rfq_responses
table! {
    rfq_responses (id) {
        id -> Integer,
        rfq_id -> Integer,
        supplier_id -> Integer,
        supplier_company -> Nullable<VarChar>,
        price_amount -> Double,
        price_currency -> VarChar,
        message -> Nullable<VarChar>,
        status -> VarChar,
        created_at -> Timestamp, // UTC 0, generated at db level
        updated_at -> Timestamp, // UTC 0, generated at db level
    }
}

/// diesel table for membership_applications
table! {
    membership_applications (id) {
        id -> Integer,
        user_id -> Integer,
        company_name -> VarChar,
        requested_tier -> VarChar,
        message -> Nullable<VarChar>,
        status -> VarChar,
        reviewer_id -> Nullable<Integer>,
        reviewed_at -> Nullable<Timestamp>,
        created_at -> Timestamp, // UTC 0, generated at db level
        updated_at -> Timestamp, // UTC 0, generated at db level
    }
}

joinable!(products -> companies (company_id));
joinable!(products -> categories (category_id));
joinable!(company_categories -> companies (company_id));
joinable!(company_categories -> categories (category_id));
joinable!(rfqs -> categories (category_id));
joinable!(rfqs -> users (buyer_id));
joinable!(rfq_responses -> rfqs (rfq_id));
joinable!(rfq_responses -> users (supplier_id));
joinable!(membership_applications -> users (user_id));

allow_tables_to_appear_in_same_query!(
    categories,
    companies,
    company_categories,
    products,
    users,
    rfqs,
    rfq_responses,
    membership_applications,
);

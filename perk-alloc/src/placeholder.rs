use perk_core::models::{Category, Coupon, DiscountKind};

/// Safe generic coupons shown when the pool cannot serve the request.
/// The rewards surface always gets something to render.
pub fn placeholder_coupons(category: &Category, country: &str) -> Vec<Coupon> {
    let entries: [(&str, &str, &str, i32, DiscountKind); 3] = [
        (
            "Everyday Savings",
            "10% off your next order",
            "WELCOME10",
            10,
            DiscountKind::Percentage,
        ),
        (
            "Member Rewards",
            "15% off sitewide for members",
            "SAVE15",
            15,
            DiscountKind::Percentage,
        ),
        (
            "Local Deals",
            "5 off any purchase over 25",
            "TAKE5",
            5,
            DiscountKind::Flat,
        ),
    ];

    entries
        .into_iter()
        .map(|(merchant, text, code, value, kind)| {
            Coupon::new(
                merchant.to_string(),
                text.to_string(),
                code.to_string(),
                String::new(),
                value,
                kind,
                category.clone(),
                country.to_string(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn placeholders_fit_the_batch_and_are_eligible() {
        let batch = placeholder_coupons(&Category::new("food"), "IN");
        assert!(!batch.is_empty());
        assert!(batch.len() <= perk_core::models::BATCH_SIZE);
        for coupon in &batch {
            assert!(coupon.is_eligible_at(Utc::now()));
            assert!(!coupon.verified);
            assert_eq!(coupon.currency_code, "INR");
        }
    }
}

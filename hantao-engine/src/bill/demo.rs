//! Demo bill fixture
//!
//! The three-receipt party scenario shipped with the app: one receipt
//! with SC + VAT, one without service charge paid by a non-default
//! payer, and one with a 10% discount.

use shared::error::BillResult;
use shared::models::{DiscountType, ItemInput, MemberCreate};

use super::{Bill, DEFAULT_RECEIPT_ID};

fn demo_item(
    name: &str,
    price: f64,
    quantity: i32,
    assigned: &[&String],
    paid_by: &str,
    receipt_id: &str,
) -> ItemInput {
    ItemInput {
        name: name.to_string(),
        price,
        quantity,
        assigned_member_ids: assigned.iter().map(|id| (*id).clone()).collect(),
        paid_by: Some(paid_by.to_string()),
        note: None,
        receipt_id: receipt_id.to_string(),
    }
}

impl Bill {
    pub fn demo() -> BillResult<Bill> {
        let mut bill = Bill::new("ปาร์ตี้วันเกิดเอก 🎂");

        let nat = bill.add_member(MemberCreate {
            name: "นัท (คนจ่าย)".to_string(),
            prompt_pay_id: Some("081-234-5678".to_string()),
        });
        let beam = bill.add_member(MemberCreate::named("บีม"));
        let ek = bill.add_member(MemberCreate::named("เอก"));
        let joy = bill.add_member(MemberCreate::named("จอย"));
        let mai = bill.add_member(MemberCreate::named("ไหม"));
        let everyone = [&nat, &beam, &ek, &joy, &mai];

        let r1 = bill.add_receipt("MK Suki (SC 10% + VAT 7%)");
        let r2 = bill.add_receipt("After You (No SC, จอยจ่าย)");
        let r3 = bill.add_receipt("Rooftop Bar (ลด 10%)");
        bill.remove_receipt(DEFAULT_RECEIPT_ID)?;

        bill.update_receipt_rates(&r1, 10.0, 7.0)?;
        bill.update_receipt_rates(&r2, 0.0, 7.0)?;
        bill.update_receipt_rates(&r3, 10.0, 7.0)?;
        bill.update_receipt_discount(&r3, DiscountType::Percent, 10.0)?;

        // Receipt 1: MK (paid by the default payer)
        bill.add_item(demo_item("ชุดผักรวม", 450.0, 1, &everyone, &nat, &r1))?;
        bill.add_item(demo_item(
            "เป็ดย่างจานใหญ่",
            350.0,
            1,
            &[&nat, &beam, &ek],
            &nat,
            &r1,
        ))?;
        bill.add_item(demo_item(
            "บะหมี่หยก",
            50.0,
            4,
            &[&nat, &beam, &ek, &joy],
            &nat,
            &r1,
        ))?;

        // Receipt 2: cafe (paid by Joy)
        bill.add_item(demo_item(
            "Shibuya Honey Toast",
            285.0,
            1,
            &[&joy, &mai],
            &joy,
            &r2,
        ))?;
        bill.add_item(demo_item(
            "Strawberry Kakigori",
            325.0,
            1,
            &[&nat, &beam, &ek],
            &joy,
            &r2,
        ))?;
        bill.add_item(demo_item("น้ำแร่", 40.0, 1, &everyone, &joy, &r2))?;

        // Receipt 3: bar (discounted, paid by the default payer)
        bill.add_item(demo_item(
            "Signature Cocktail",
            380.0,
            2,
            &[&beam, &mai],
            &nat,
            &r3,
        ))?;
        bill.add_item(demo_item(
            "Craft Beer Tower",
            1200.0,
            1,
            &[&nat, &ek, &joy],
            &nat,
            &r3,
        ))?;
        bill.add_item(demo_item("French Fries", 150.0, 1, &everyone, &nat, &r3))?;

        Ok(bill)
    }
}

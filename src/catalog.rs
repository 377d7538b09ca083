//! Fixed PCOS reference lists offered to the front end when logging.

use serde::Serialize;

pub const SYMPTOMS: &[&str] = &[
    "Hair Loss",
    "Acne",
    "Irregular Periods",
    "Weight Gain",
    "Insulin Resistance",
    "Fatigue",
    "Hirsutism (Excess Hair Growth)",
    "Mood Swings",
    "Cysts on Ovaries",
    "Thinning Hair",
    "Sleep Apnea",
    "Infertility",
    "Depression",
    "Anxiety",
    "Brain Fog",
    "Pelvic Pain",
    "Skin Tags",
    "Darkened Skin Patches (Acanthosis Nigricans)",
    "Headaches",
    "Water Retention",
    "Weight Loss Difficulty",
    "Heavy Menstrual Bleeding",
    "High Blood Pressure",
    "Fatty Liver Disease",
    "Elevated Cholesterol Levels",
    "Type 2 Diabetes",
    "Migraines",
    "Low Libido",
];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Treatment {
    pub name: &'static str,
    pub description: &'static str,
}

pub const TREATMENTS: &[Treatment] = &[
    Treatment {
        name: "Metformin",
        description: "Used to improve insulin resistance, which can help regulate menstrual cycles and ovulation.",
    },
    Treatment {
        name: "Clomiphene (Clomid)",
        description: "An oral medication used to stimulate the pituitary gland to release hormones necessary to trigger ovulation.",
    },
    Treatment {
        name: "Letrozole (Femara)",
        description: "An aromatase inhibitor used off-label to stimulate ovulation, often with fewer side effects than Clomiphene.",
    },
    Treatment {
        name: "Birth Control Pills",
        description: "Combination pills used to regulate menstrual cycles, reduce androgen levels (acne, hair growth), and protect the uterine lining.",
    },
    Treatment {
        name: "Spironolactone",
        description: "A diuretic that also blocks the effects of androgens, used primarily to treat hirsutism (excessive hair growth) and acne.",
    },
    Treatment {
        name: "Eflornithine cream (Vaniqa)",
        description: "A prescription cream applied directly to the skin to slow down the growth of unwanted facial hair.",
    },
    Treatment {
        name: "Gonadotropins",
        description: "Injectable hormones (FSH and LH) used when oral fertility medications fail to directly stimulate the ovaries to produce eggs.",
    },
    Treatment {
        name: "Progestin therapy",
        description: "Progestin is taken periodically to induce a withdrawal bleed, protecting the uterus lining from the risk of endometrial hyperplasia.",
    },
    Treatment {
        name: "GLP-1 Receptor Agonists (e.g., Semaglutide)",
        description: "Injectable drugs used for weight management and blood sugar control, which can improve PCOS metabolic outcomes.",
    },
    Treatment {
        name: "Diet modification",
        description: "Focusing on low glycemic index (GI) foods, balanced carbohydrates, and healthy fats to manage blood sugar and insulin levels.",
    },
    Treatment {
        name: "Regular exercise",
        description: "Physical activity that improves insulin sensitivity, supports weight management, and boosts mood.",
    },
    Treatment {
        name: "Weight management",
        description: "Achieving and maintaining a healthy weight, which can significantly improve all PCOS symptoms, including hormonal balance and fertility.",
    },
    Treatment {
        name: "Myo-inositol",
        description: "A B-vitamin-like substance that acts as an insulin sensitizer, helping to improve egg quality and menstrual regularity.",
    },
    Treatment {
        name: "D-chiro-inositol",
        description: "Often combined with Myo-inositol, this supplement is part of the insulin signaling pathway and helps improve glucose metabolism.",
    },
    Treatment {
        name: "Vitamin D supplementation",
        description: "Used to correct common deficiencies in PCOS patients; may improve insulin sensitivity and support ovarian function.",
    },
    Treatment {
        name: "Omega-3 fatty acids",
        description: "Essential fats that help reduce inflammation and may improve lipid profiles and insulin resistance.",
    },
    Treatment {
        name: "Ovarian drilling",
        description: "A laparoscopic surgery where small holes are made in the ovaries to reduce androgen production and sometimes trigger ovulation.",
    },
];

pub const TREATMENT_TYPES: &[&str] = &["Medication", "Lifestyle", "Supplement", "Surgical Procedure"];

pub const GOALS: &[&str] = &[
    "Regulate Menstrual Cycles",
    "Induce Ovulation",
    "Manage Insulin Resistance",
    "Reduce Androgen Levels",
    "Support Weight Management",
    "Improve Fertility",
    "Enhance Mental Health",
    "Reduce Hair Growth",
    "Clear Acne",
    "Boost Energy Levels",
    "Improve Sleep Quality",
    "Enhance Overall Well-being",
    "Minimize Hair Thinning",
];

pub const LOG_TYPES: &[&str] = &["Period", "Ovulation", "Sexual Activity", "Treatment", "Event"];

pub const INSIGHT_STATUSES: &[&str] = &["IMPROVED", "WORSENED", "NO_CHANGE"];

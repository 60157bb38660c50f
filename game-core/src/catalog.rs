use serde::{Deserialize, Serialize};

use crate::{HomeType, HouseholdConditions};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Base,
    Management,
    Home,
    Children,
    Car,
    Pets,
}

/// Household flag a category depends on. Categories without one are always
/// part of the task sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    House,
    HasChildren,
    HasCar,
    HasPets,
}

impl Condition {
    pub fn holds(self, conditions: &HouseholdConditions) -> bool {
        match self {
            Condition::House => conditions.home_type == HomeType::House,
            Condition::HasChildren => conditions.has_children,
            Condition::HasCar => conditions.has_car,
            Condition::HasPets => conditions.has_pets,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CategoryDef {
    pub category: Category,
    pub key: &'static str,
    pub label: &'static str,
    pub tasks: &'static [&'static str],
    pub condition: Option<Condition>,
}

impl CategoryDef {
    pub fn applies_to(&self, conditions: &HouseholdConditions) -> bool {
        self.condition.map_or(true, |c| c.holds(conditions))
    }
}

const BASE_TASKS: &[&str] = &[
    "Washing dishes",
    "Laundry",
    "Vacuuming",
    "Taking out the trash",
    "Paying bills",
    "Grocery shopping",
    "Cooking",
    "Mopping floors",
    "Watering plants",
    "Sorting out closets",
    "Cleaning the kitchen",
    "Cleaning the bathroom and toilet",
    "Dusting",
    "Making the bed",
    "Small repairs",
    "Assembling furniture",
    "Washing windows",
];

const MANAGEMENT_TASKS: &[&str] = &[
    "Shopping list",
    "Budget planning",
    "To-do list",
    "Splitting up cleaning duties",
    "Vacation planning",
    "Buying gifts",
    "Ordering household supplies",
    "Furnishing the home",
    "Planning big purchases",
    "Family activities",
    "Dates",
    "Charging devices",
    "Doctor appointments",
    "Ordering food",
    "Meal planning",
    "Communication",
];

const HOME_TASKS: &[&str] = &["Clearing snow", "Mowing the lawn"];

const CHILDREN_TASKS: &[&str] = &[
    "School and daycare runs",
    "Talking to the school",
    "Organizing meals",
    "Organizing leisure",
    "House rules",
    "Vaccinations",
    "Homework",
    "Screen time",
];

const CAR_TASKS: &[&str] = &["Car maintenance", "Car insurance", "Refueling"];

const PET_TASKS: &[&str] = &["Feeding", "Vet visits", "Walks"];

/// Categories in the order they are appended to a task sequence.
pub static CATALOG: [CategoryDef; 6] = [
    CategoryDef {
        category: Category::Base,
        key: "base",
        label: "Basics",
        tasks: BASE_TASKS,
        condition: None,
    },
    CategoryDef {
        category: Category::Management,
        key: "management",
        label: "Management",
        tasks: MANAGEMENT_TASKS,
        condition: None,
    },
    CategoryDef {
        category: Category::Home,
        key: "home",
        label: "House",
        tasks: HOME_TASKS,
        condition: Some(Condition::House),
    },
    CategoryDef {
        category: Category::Children,
        key: "children",
        label: "Children",
        tasks: CHILDREN_TASKS,
        condition: Some(Condition::HasChildren),
    },
    CategoryDef {
        category: Category::Car,
        key: "car",
        label: "Car",
        tasks: CAR_TASKS,
        condition: Some(Condition::HasCar),
    },
    CategoryDef {
        category: Category::Pets,
        key: "pets",
        label: "Pets",
        tasks: PET_TASKS,
        condition: Some(Condition::HasPets),
    },
];

// CATALOG is declared in `Category` discriminant order.
pub fn definition(category: Category) -> &'static CategoryDef {
    &CATALOG[category as usize]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub name: String,
    pub category: Category,
}

pub fn generate_entries(conditions: &HouseholdConditions) -> Vec<Task> {
    CATALOG
        .iter()
        .filter(|def| def.applies_to(conditions))
        .flat_map(|def| {
            def.tasks.iter().map(move |name| Task {
                name: (*name).to_string(),
                category: def.category,
            })
        })
        .collect()
}

pub fn generate(conditions: &HouseholdConditions) -> Vec<String> {
    generate_entries(conditions)
        .into_iter()
        .map(|task| task.name)
        .collect()
}

/// Looks a task name up in the catalog; the first declaring category wins.
pub fn category_of(task: &str) -> Option<Category> {
    CATALOG
        .iter()
        .find(|def| def.tasks.contains(&task))
        .map(|def| def.category)
}

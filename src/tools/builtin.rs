//! The built-in partner tool catalog.

use crate::operations::leads::{
    CORPORATE_TRAINING_FIELD, IDENTITY_GROUPS, OWNER_IDS_FIELD, TEXT_FIELDS,
};
use crate::operations::Operation;
use crate::tools::catalog::{ParamDef, ParamType, ToolCatalog, ToolEntry};
use crate::types::Result;

fn corp_id() -> ParamDef {
    ParamDef::optional("corp_id", ParamType::String, "Organization ID")
}

fn page() -> [ParamDef; 2] {
    [
        ParamDef::optional("limit", ParamType::Int, "Maximum number of results"),
        ParamDef::optional("offset", ParamType::Int, "Offset for pagination"),
    ]
}

fn user_tools() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            Operation::CreateUser,
            "Create a new user by mobile number or email",
            vec![
                ParamDef::optional("mobile", ParamType::String, "User's mobile number"),
                ParamDef::optional("area_code", ParamType::String, "Area code of the mobile number"),
                ParamDef::optional("email", ParamType::String, "User's email address"),
                ParamDef::optional("source", ParamType::String, "Source of the user creation"),
                corp_id(),
            ],
        )
        .with_one_of(&[&["mobile"], &["email"]]),
        ToolEntry::new(
            Operation::FetchUserProfile,
            "Fetch user profile information",
            vec![
                ParamDef::required("user_id", ParamType::String, "User ID to fetch"),
                corp_id(),
            ],
        ),
        ToolEntry::new(
            Operation::UpdateUserOwner,
            "Update the owner of a user",
            vec![
                ParamDef::required("user_id", ParamType::String, "User ID to update"),
                ParamDef::required("owner_id", ParamType::String, "New owner ID"),
                corp_id(),
            ],
        ),
        ToolEntry::new(
            Operation::UpdateUserPool,
            "Update the pool assignment of a user",
            vec![
                ParamDef::required("user_id", ParamType::String, "User ID to update"),
                ParamDef::required("pool_id", ParamType::String, "New pool ID"),
                corp_id(),
            ],
        ),
        ToolEntry::new(
            Operation::UpdateUserEmail,
            "Update a user's email address",
            vec![
                ParamDef::required("user_id", ParamType::String, "User ID to update"),
                ParamDef::required("email", ParamType::String, "New email address"),
                corp_id(),
            ],
        ),
        ToolEntry::new(
            Operation::FetchUserContact,
            "Fetch user contact information",
            vec![
                ParamDef::required("user_id", ParamType::String, "User ID to fetch contact for"),
                ParamDef::optional("contact_type", ParamType::String, "Contact type to fetch"),
                corp_id(),
            ],
        ),
    ]
}

fn tag_tools() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            Operation::CreateTagGroup,
            "Create a new tag group",
            vec![
                ParamDef::required("name", ParamType::String, "Tag group name"),
                ParamDef::optional("description", ParamType::String, "Tag group description"),
                corp_id(),
            ],
        ),
        ToolEntry::new(
            Operation::ListTagGroups,
            "List all tag groups",
            page().into_iter().chain([corp_id()]).collect(),
        ),
        ToolEntry::new(
            Operation::UpdateTagGroup,
            "Update an existing tag group",
            vec![
                ParamDef::required("group_id", ParamType::String, "Tag group ID"),
                ParamDef::optional("name", ParamType::String, "New name"),
                ParamDef::optional("description", ParamType::String, "New description"),
                corp_id(),
            ],
        ),
        ToolEntry::new(
            Operation::DeactivateTagGroup,
            "Deactivate a tag group",
            vec![
                ParamDef::required("group_id", ParamType::String, "Tag group ID to deactivate"),
                corp_id(),
            ],
        ),
        ToolEntry::new(
            Operation::ActivateTagGroup,
            "Activate a tag group",
            vec![
                ParamDef::required("group_id", ParamType::String, "Tag group ID to activate"),
                corp_id(),
            ],
        ),
        ToolEntry::new(
            Operation::AssignUserTag,
            "Assign a tag to a user",
            vec![
                ParamDef::required("user_id", ParamType::String, "User ID"),
                ParamDef::required("tag_id", ParamType::String, "Tag ID to assign"),
                corp_id(),
            ],
        ),
        ToolEntry::new(
            Operation::ListUserTags,
            "List tags assigned to a user",
            vec![
                ParamDef::required("user_id", ParamType::String, "User ID to list tags for"),
                corp_id(),
            ],
        ),
    ]
}

fn order_tools() -> Vec<ToolEntry> {
    vec![
        ToolEntry::new(
            Operation::FetchOrder,
            "Fetch details for a specific order",
            vec![
                ParamDef::required("order_id", ParamType::String, "Order ID to fetch"),
                corp_id(),
            ],
        ),
        ToolEntry::new(
            Operation::ListOrders,
            "List orders with optional filtering",
            [
                ParamDef::optional("user_id", ParamType::String, "Filter by user ID"),
                ParamDef::optional("status", ParamType::String, "Filter by order status"),
            ]
            .into_iter()
            .chain(page())
            .chain([corp_id()])
            .collect(),
        ),
        ToolEntry::new(
            Operation::ListOrderFinancials,
            "List financial records for orders",
            [ParamDef::optional("order_id", ParamType::String, "Filter by order ID")]
                .into_iter()
                .chain(page())
                .chain([corp_id()])
                .collect(),
        ),
    ]
}

fn leads_tools() -> Vec<ToolEntry> {
    let mut parameters: Vec<ParamDef> = TEXT_FIELDS
        .iter()
        .map(|(name, description)| ParamDef::optional(name, ParamType::String, description))
        .collect();
    parameters.push(ParamDef::optional(
        CORPORATE_TRAINING_FIELD,
        ParamType::Bool,
        "Is corporate training",
    ));
    parameters.push(ParamDef::optional(
        OWNER_IDS_FIELD,
        ParamType::StringList,
        "Owner IDs",
    ));

    vec![ToolEntry::new(
        Operation::ImportLeads,
        "Import a lead identified by user_id or by area_code and mobile",
        parameters,
    )
    .with_one_of(IDENTITY_GROUPS)]
}

/// Build the catalog of every partner tool, grouped user, tag, order, leads.
pub fn builtin_catalog() -> Result<ToolCatalog> {
    let mut catalog = ToolCatalog::new();
    for entry in user_tools()
        .into_iter()
        .chain(tag_tools())
        .chain(order_tools())
        .chain(leads_tools())
    {
        catalog.register(entry)?;
    }
    Ok(catalog)
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Projects::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Projects::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Projects::Color).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TagTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TagTypes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TagTypes::Name).string().not_null())
                    .col(ColumnDef::new(TagTypes::Description).string().null())
                    .col(
                        ColumnDef::new(TagTypes::Exclusive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(TagTypes::ProjectId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tag_types-project_id")
                            .from(TagTypes::Table, TagTypes::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tags::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tags::Name).string().not_null())
                    .col(ColumnDef::new(Tags::Description).string().null())
                    .col(ColumnDef::new(Tags::TagTypeId).integer().not_null())
                    .col(ColumnDef::new(Tags::ProjectId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tags-tag_type_id")
                            .from(Tags::Table, Tags::TagTypeId)
                            .to(TagTypes::Table, TagTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tags-project_id")
                            .from(Tags::Table, Tags::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Definitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Definitions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    // Authoritative uniqueness; the handler pre-check only gives a nicer error.
                    .col(
                        ColumnDef::new(Definitions::Text)
                            .text()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Definitions::Source)
                            .string()
                            .not_null()
                            .default("dispatch"),
                    )
                    .col(ColumnDef::new(Definitions::ProjectId).integer().null())
                    .col(
                        ColumnDef::new(Definitions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Definitions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-definitions-project_id")
                            .from(Definitions::Table, Definitions::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Cases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cases::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cases::Name).string().null())
                    .col(ColumnDef::new(Cases::Title).string().not_null())
                    .col(ColumnDef::new(Cases::Description).text().not_null())
                    .col(ColumnDef::new(Cases::Resolution).text().null())
                    .col(
                        ColumnDef::new(Cases::Status)
                            .string()
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(Cases::Visibility)
                            .string()
                            .not_null()
                            .default("open"),
                    )
                    .col(
                        ColumnDef::new(Cases::ReportedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Cases::StableAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Cases::ClosedAt).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Cases::DuplicateId).integer().null())
                    .col(ColumnDef::new(Cases::ProjectId).integer().not_null())
                    .col(
                        ColumnDef::new(Cases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cases::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cases-duplicate_id")
                            .from(Cases::Table, Cases::DuplicateId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cases-project_id")
                            .from(Cases::Table, Cases::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AssocCaseTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AssocCaseTags::CaseId).integer().not_null())
                    .col(ColumnDef::new(AssocCaseTags::TagId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(AssocCaseTags::CaseId)
                            .col(AssocCaseTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assoc_case_tags-case_id")
                            .from(AssocCaseTags::Table, AssocCaseTags::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assoc_case_tags-tag_id")
                            .from(AssocCaseTags::Table, AssocCaseTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Tickets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tickets::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tickets::ResourceId).string().null())
                    .col(ColumnDef::new(Tickets::ResourceType).string().null())
                    .col(ColumnDef::new(Tickets::Weblink).string().null())
                    .col(
                        ColumnDef::new(Tickets::CaseId)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tickets-case_id")
                            .from(Tickets::Table, Tickets::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Events::StartedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Events::EndedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Events::Source).string().not_null())
                    .col(ColumnDef::new(Events::Description).text().not_null())
                    .col(ColumnDef::new(Events::CaseId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-events-case_id")
                            .from(Events::Table, Events::CaseId)
                            .to(Cases::Table, Cases::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tickets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssocCaseTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Definitions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TagTypes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Name,
    Color,
}

#[derive(DeriveIden)]
enum TagTypes {
    Table,
    Id,
    Name,
    Description,
    Exclusive,
    ProjectId,
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Name,
    Description,
    TagTypeId,
    ProjectId,
}

#[derive(DeriveIden)]
enum Definitions {
    Table,
    Id,
    Text,
    Source,
    ProjectId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Cases {
    Table,
    Id,
    Name,
    Title,
    Description,
    Resolution,
    Status,
    Visibility,
    ReportedAt,
    StableAt,
    ClosedAt,
    DuplicateId,
    ProjectId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum AssocCaseTags {
    Table,
    CaseId,
    TagId,
}

#[derive(DeriveIden)]
enum Tickets {
    Table,
    Id,
    ResourceId,
    ResourceType,
    Weblink,
    CaseId,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    StartedAt,
    EndedAt,
    Source,
    Description,
    CaseId,
}

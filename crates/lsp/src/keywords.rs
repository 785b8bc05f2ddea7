//! Static keyword tables for program (`.4gl`) and form (`.per`) files.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Keyword {
    pub name: &'static str,
    pub kind: &'static str,
    pub description: &'static str,
}

const fn kw(name: &'static str, kind: &'static str, description: &'static str) -> Keyword {
    Keyword {
        name,
        kind,
        description,
    }
}

pub static PROGRAM_KEYWORDS: &[Keyword] = &[
    kw("MAIN", "block", "Program entry point, closed by END MAIN."),
    kw("FUNCTION", "block", "Declares a function, closed by END FUNCTION."),
    kw("REPORT", "block", "Declares a report routine, closed by END REPORT."),
    kw("END", "statement", "Closes the enclosing block or compound statement."),
    kw("DEFINE", "declaration", "Declares one or more variables."),
    kw("RECORD", "type", "Structured type made of named members."),
    kw("ARRAY", "type", "Static or dynamic array type."),
    kw("DYNAMIC", "type", "Marks an array whose size grows on demand."),
    kw("LIKE", "type", "Takes the type of a database column."),
    kw("TYPE", "declaration", "Declares a user type."),
    kw("CONSTANT", "declaration", "Declares a named constant."),
    kw("GLOBALS", "declaration", "Declares or imports global variables."),
    kw("IMPORT", "declaration", "Imports a module or a foreign library."),
    kw("SCHEMA", "declaration", "Selects the database schema used for LIKE."),
    kw("DATABASE", "declaration", "Selects the database schema and opens it at runtime."),
    kw("PUBLIC", "modifier", "Makes a module symbol visible to importers."),
    kw("PRIVATE", "modifier", "Restricts a module symbol to its module."),
    kw("CALL", "statement", "Invokes a function."),
    kw("RETURNING", "clause", "Receives the values returned by CALL."),
    kw("RETURN", "statement", "Leaves the function, optionally with values."),
    kw("LET", "statement", "Assigns a value to a variable."),
    kw("IF", "statement", "Conditional execution, closed by END IF."),
    kw("THEN", "clause", "Starts the branch of an IF statement."),
    kw("ELSE", "clause", "Alternative branch of IF or CASE."),
    kw("CASE", "statement", "Multi-way branch, closed by END CASE."),
    kw("WHEN", "clause", "One branch of a CASE statement."),
    kw("OTHERWISE", "clause", "Default branch of a CASE statement."),
    kw("FOR", "statement", "Counted loop, closed by END FOR."),
    kw("TO", "clause", "Upper bound of a FOR loop."),
    kw("STEP", "clause", "Increment of a FOR loop."),
    kw("FOREACH", "statement", "Iterates over the rows of a cursor, closed by END FOREACH."),
    kw("WHILE", "statement", "Conditional loop, closed by END WHILE."),
    kw("CONTINUE", "statement", "Jumps to the next iteration of a loop or dialog."),
    kw("EXIT", "statement", "Leaves a loop, a dialog or the program."),
    kw("INITIALIZE", "statement", "Sets variables to NULL or to default values."),
    kw("DISPLAY", "statement", "Shows values on screen or in a form."),
    kw("MESSAGE", "statement", "Shows a message in the message area."),
    kw("ERROR", "statement", "Shows an error message."),
    kw("PROMPT", "statement", "Asks the user for a value."),
    kw("MENU", "dialog", "Ring menu dialog, closed by END MENU."),
    kw("INPUT", "dialog", "Edits variables through form fields."),
    kw("CONSTRUCT", "dialog", "Builds a query condition from form fields."),
    kw("DIALOG", "dialog", "Multiple-dialog block, closed by END DIALOG."),
    kw("OPEN", "statement", "Opens a window, form or cursor."),
    kw("CLOSE", "statement", "Closes a window, form or cursor."),
    kw("WINDOW", "clause", "Names a window in OPEN or CLOSE."),
    kw("FORM", "clause", "Names a form in OPEN or CLOSE."),
    kw("DECLARE", "sql", "Declares a database cursor."),
    kw("PREPARE", "sql", "Prepares a dynamic SQL statement."),
    kw("EXECUTE", "sql", "Runs a prepared SQL statement."),
    kw("FETCH", "sql", "Reads the next row from a cursor."),
    kw("SELECT", "sql", "Static SQL query."),
    kw("INSERT", "sql", "Static SQL insert."),
    kw("UPDATE", "sql", "Static SQL update."),
    kw("DELETE", "sql", "Static SQL delete."),
    kw("WHENEVER", "statement", "Sets the exception handling mode."),
    kw("TRY", "statement", "Exception block, closed by END TRY."),
    kw("CATCH", "clause", "Handler section of a TRY block."),
    kw("OUTPUT", "statement", "OUTPUT TO REPORT feeds a row to a report."),
    kw("START", "statement", "START REPORT begins report output."),
    kw("FINISH", "statement", "FINISH REPORT completes report output."),
    kw("NULL", "value", "The null value."),
    kw("TRUE", "value", "Boolean true."),
    kw("FALSE", "value", "Boolean false."),
    kw("AND", "operator", "Logical conjunction."),
    kw("OR", "operator", "Logical disjunction."),
    kw("NOT", "operator", "Logical negation."),
    kw("INTEGER", "type", "32-bit signed integer."),
    kw("SMALLINT", "type", "16-bit signed integer."),
    kw("BIGINT", "type", "64-bit signed integer."),
    kw("DECIMAL", "type", "Fixed point decimal, DECIMAL(precision, scale)."),
    kw("FLOAT", "type", "Double precision floating point."),
    kw("CHAR", "type", "Fixed length character string."),
    kw("VARCHAR", "type", "Variable length character string."),
    kw("STRING", "type", "Dynamic character string."),
    kw("DATE", "type", "Calendar date."),
    kw("DATETIME", "type", "Date and time with a qualifier."),
    kw("BOOLEAN", "type", "TRUE or FALSE."),
];

pub static FORM_KEYWORDS: &[Keyword] = &[
    kw("LAYOUT", "section", "Declares the form layout tree."),
    kw("GRID", "container", "Grid container positioning items by cells."),
    kw("GROUP", "container", "Container with a titled border."),
    kw("VBOX", "container", "Stacks children vertically."),
    kw("HBOX", "container", "Stacks children horizontally."),
    kw("TABLE", "container", "Screen array displayed as a table."),
    kw("TREE", "container", "Screen array displayed as a tree."),
    kw("FOLDER", "container", "Container of PAGE children shown as tabs."),
    kw("PAGE", "container", "One tab of a FOLDER."),
    kw("SCREEN", "section", "Legacy screen layout section."),
    kw("TABLES", "section", "Lists the database tables used by the form."),
    kw("ATTRIBUTES", "section", "Defines the form items and their properties."),
    kw("INSTRUCTIONS", "section", "Declares screen records and arrays."),
    kw("ACTION", "section", "ACTION DEFAULTS section for action views."),
    kw("TOPMENU", "section", "Pull-down menu of the form."),
    kw("TOOLBAR", "section", "Toolbar of the form."),
    kw("EDIT", "item", "Single line input field."),
    kw("TEXTEDIT", "item", "Multi-line input field."),
    kw("BUTTONEDIT", "item", "Input field with a button."),
    kw("COMBOBOX", "item", "Drop-down list of values."),
    kw("CHECKBOX", "item", "Boolean input."),
    kw("RADIOGROUP", "item", "Exclusive choice between items."),
    kw("DATEEDIT", "item", "Date input with a calendar."),
    kw("LABEL", "item", "Static or field-bound text."),
    kw("BUTTON", "item", "Push button triggering an action."),
    kw("IMAGE", "item", "Displays an image."),
    kw("FORMONLY", "table", "Pseudo table for fields not bound to a column."),
    kw("TITLE", "attribute", "Title of a container or item."),
    kw("COMMENT", "attribute", "Help text shown for an item."),
    kw("REQUIRED", "attribute", "Field must be entered."),
    kw("NOENTRY", "attribute", "Field cannot be edited."),
    kw("SCROLLBARS", "attribute", "Scrollbar policy of a text field."),
    kw("STRETCH", "attribute", "Stretching policy of an item."),
    kw("STYLE", "attribute", "Presentation style name."),
    kw("END", "section", "Closes a section or container."),
];

/// The table matching the kind of file being edited.
pub fn keywords_for(form_file: bool) -> &'static [Keyword] {
    if form_file {
        FORM_KEYWORDS
    } else {
        PROGRAM_KEYWORDS
    }
}

/// Keywords are case-insensitive.
pub fn find_keyword(table: &'static [Keyword], word: &str) -> Option<&'static Keyword> {
    table.iter().find(|k| k.name.eq_ignore_ascii_case(word))
}

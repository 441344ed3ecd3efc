mod cell;

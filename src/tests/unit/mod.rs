mod combat;
